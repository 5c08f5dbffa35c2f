//! The `info` command: image identity, streams, tables and heaps.

use std::path::Path;

use anyhow::Context;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use dottrim::CilView;

pub fn run(path: &Path) -> anyhow::Result<()> {
    let view = CilView::from_path(path)
        .with_context(|| format!("loading CLI image from {}", path.display()))?;

    let module_name = view
        .strings()
        .and_then(|strings| {
            view.tables
                .tables
                .module
                .get(1)
                .and_then(|module| strings.get(module.name as usize).ok().map(String::from))
        })
        .unwrap_or_else(|| "<unknown>".to_string());

    println!("Module:           {module_name}");
    if let Some(assembly) = view.tables.tables.assembly.get(1) {
        let name = view
            .strings()
            .and_then(|strings| strings.get(assembly.name as usize).ok().map(String::from))
            .unwrap_or_else(|| "<unknown>".to_string());
        println!(
            "Assembly:         {name} {}.{}.{}.{}",
            assembly.major_version,
            assembly.minor_version,
            assembly.build_number,
            assembly.revision_number
        );
    }
    println!("Metadata version: {}", view.root.version);
    println!(
        "Entry point:      {:#010x}",
        view.cor20.entry_point_token
    );

    println!("\nStreams:");
    for header in &view.root.stream_headers {
        println!(
            "  {:<10} offset {:#8x}  size {:#8x}",
            header.name, header.offset, header.size
        );
    }

    // Diagnostic figure: rough size of the metadata root header itself
    let overhead = 100 + 20 * view.root.stream_headers.len();
    println!("  (base overhead estimate: {overhead} bytes)");

    if let Some(guids) = view.guids() {
        println!("\nGUIDs:            {}", guids.count());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(["Table", "Rows", "Row size", "Offset"]);

    for table_id in view.tables.present_tables() {
        let rows = view.tables.row_count(table_id);
        let row_size = dottrim::metadata::tables::row_size_of(table_id, &view.tables.info);
        let offset = view.tables.table_offset(table_id).unwrap_or_default();

        table.add_row([
            format!("{table_id:?}"),
            rows.to_string(),
            row_size.to_string(),
            format!("{offset:#x}"),
        ]);
    }

    println!("\n{table}");

    Ok(())
}
