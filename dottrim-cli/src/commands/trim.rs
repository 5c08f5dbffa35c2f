//! The `trim` command: run S0 or S1 (optionally plus the deep closure) and
//! write the trimmed image next to the input.

use std::path::{Path, PathBuf};

use anyhow::Context;
use dottrim::{trim, InvokedMethods, TrimLevel};
use log::info;

use crate::stats::InvocationReport;

pub struct TrimOptions<'a> {
    pub stats: &'a Path,
    pub assembly: &'a str,
    pub method_level: bool,
    pub deep: bool,
    pub output: Option<&'a Path>,
}

pub fn run(path: &Path, options: &TrimOptions<'_>) -> anyhow::Result<()> {
    let report = InvocationReport::load(options.stats)?;
    let names = report.method_names(options.assembly);
    if names.is_empty() {
        anyhow::bail!(
            "statistics document records no methods for assembly '{}'",
            options.assembly
        );
    }

    let invoked = InvokedMethods::from_names(&names);
    info!(
        "{} invoked methods recorded for '{}'",
        invoked.len(),
        options.assembly
    );

    let image = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let level = if options.method_level {
        TrimLevel::Method
    } else {
        TrimLevel::Class
    };

    let outcome = trim::trim(&image, &invoked, level, options.deep)
        .with_context(|| format!("trimming {}", path.display()))?;

    let output = options
        .output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(path, level, options.deep));

    std::fs::write(&output, &outcome.image)
        .with_context(|| format!("writing {}", output.display()))?;

    let stats = &outcome.stats;
    println!("Wrote {} ({} bytes)", output.display(), outcome.image.len());
    println!("  bytes zeroed:        {}", stats.bytes_zeroed);
    println!("  types zeroed:        {}", stats.types_zeroed);
    println!("  method bodies:       {}", stats.method_bodies_zeroed);
    if options.method_level {
        println!("  methods retained:    {}", stats.methods_retained);
    }
    println!("  strings cleared:     {}", stats.strings_zeroed);
    if options.deep {
        println!("  aux rows cleared:    {}", stats.aux_rows_zeroed);
        println!("  blob entries:        {}", stats.blob_entries_zeroed);
        println!("  user strings:        {}", stats.us_entries_zeroed);
    }

    Ok(())
}

/// The conventional output path: `input.s0` / `input.s1`, plus `.d` for a
/// deep run.
fn default_output_path(input: &Path, level: TrimLevel, deep: bool) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(match level {
        TrimLevel::Class => ".s0",
        TrimLevel::Method => ".s1",
    });
    if deep {
        name.push(".d");
    }
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_convention() {
        let input = Path::new("App.dll");

        assert_eq!(
            default_output_path(input, TrimLevel::Class, false),
            PathBuf::from("App.dll.s0")
        );
        assert_eq!(
            default_output_path(input, TrimLevel::Method, false),
            PathBuf::from("App.dll.s1")
        );
        assert_eq!(
            default_output_path(input, TrimLevel::Class, true),
            PathBuf::from("App.dll.s0.d")
        );
    }
}
