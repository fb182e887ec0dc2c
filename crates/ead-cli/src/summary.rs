use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ead_export::{Diagnostic, ExportSummary};

pub fn print_export_summary(summary: &ExportSummary) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Components"), header_cell("Count")]);
    apply_table_style(&mut table);
    table.add_row(vec![Cell::new("Written"), Cell::new(summary.components_written)]);
    table.add_row(vec![Cell::new("Skipped"), dim_cell(summary.components_skipped)]);
    table.add_row(vec![
        Cell::new("Failed"),
        count_cell(summary.failures.len(), Color::Red),
    ]);
    align_column(&mut table, 1, CellAlignment::Right);
    eprintln!("{table}");

    if summary.failures.is_empty() {
        return;
    }
    let mut failures = Table::new();
    failures.set_header(vec![
        header_cell("Scope"),
        header_cell("Reference"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut failures);
    for failure in &summary.failures {
        failures.add_row(vec![
            Cell::new(failure.scope).fg(Color::Yellow),
            match failure.reference.as_deref() {
                Some(reference) => Cell::new(reference),
                None => dim_cell("-"),
            },
            Cell::new(&failure.message),
        ]);
    }
    eprintln!("{failures}");
}

pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        println!("well-formed");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Offset"),
        header_cell("Kind"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for diagnostic in diagnostics {
        let message = if diagnostic.is_suppressed() {
            dim_cell(format!("{} (ignored)", diagnostic.message))
        } else {
            Cell::new(&diagnostic.message).fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(diagnostic.offset),
            Cell::new(format!("{:?}", diagnostic.kind)),
            message,
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
