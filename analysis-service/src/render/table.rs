use comfy_table::{CellAlignment, Table};

/// `+---+` borders, `|` column separators and a rule under the header only.
const ASCII_GRID: &str = "||--+-++|    ++++++";

/// An empty table with the given header, one alignment per column.
pub fn new_table(columns: &[(&str, CellAlignment)]) -> Table {
    let mut table = Table::new();
    table.load_preset(ASCII_GRID);
    table.set_header(columns.iter().map(|(title, _)| *title));

    for (index, (_, alignment)) in columns.iter().enumerate() {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(*alignment);
        }
    }
    table
}

/// Rendered table followed by a newline.
pub fn render(table: &Table) -> String {
    let mut out = table.to_string();
    out.push('\n');
    out
}

/// Two decimals with `,` thousands separators, e.g. `-1,234.50`.
pub fn format_n2(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 4);
    if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        grouped.push('-');
    }
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push('.');
    grouped.push_str(fraction);
    grouped
}
