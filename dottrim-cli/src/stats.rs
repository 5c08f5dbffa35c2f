//! The invocation-statistics document.
//!
//! Produced by an external tracing harness; the trimmer consumes only the
//! set of method names recorded for one assembly. Name comparison downstream
//! is case-insensitive, so no normalisation happens here.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Root of the statistics document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationReport {
    pub assemblies: Vec<AssemblyInvocations>,
}

/// Recorded invocations for one assembly.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyInvocations {
    pub assembly_name: String,
    pub methods: Vec<MethodInvocation>,
}

/// One traced method.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInvocation {
    pub full_name: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub invocations: u64,
}

impl InvocationReport {
    /// Load a statistics document from disk.
    pub fn load(path: &Path) -> anyhow::Result<InvocationReport> {
        let data = std::fs::read(path)
            .with_context(|| format!("reading statistics from {}", path.display()))?;
        serde_json::from_slice(&data)
            .with_context(|| format!("parsing statistics from {}", path.display()))
    }

    /// The invoked method names recorded for `assembly`, matched
    /// case-insensitively.
    pub fn method_names(&self, assembly: &str) -> Vec<&str> {
        self.assemblies
            .iter()
            .filter(|entry| entry.assembly_name.eq_ignore_ascii_case(assembly))
            .flat_map(|entry| entry.methods.iter().map(|m| m.full_name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_filter() {
        let doc = r#"{
            "assemblies": [
                { "assemblyName": "App",
                  "methods": [
                      { "fullName": "App.Program.Main", "invocations": 3 },
                      { "fullName": "App.Util.Log", "invocations": 12 }
                  ] },
                { "assemblyName": "Lib",
                  "methods": [ { "fullName": "Lib.T.M" } ] }
            ]
        }"#;

        let report: InvocationReport = serde_json::from_str(doc).unwrap();

        assert_eq!(
            report.method_names("app"),
            vec!["App.Program.Main", "App.Util.Log"]
        );
        assert_eq!(report.method_names("Lib"), vec!["Lib.T.M"]);
        assert!(report.method_names("Other").is_empty());
    }
}
