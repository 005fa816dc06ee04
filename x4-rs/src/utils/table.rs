//! Table formatting utilities

use prettytable::{Cell, Row, Table};

/// Create a table with bold headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|h| Cell::new(h).style_spec("b"))
            .collect(),
    ));
    table
}

/// Add a row of plain cells
pub fn add_table_row(table: &mut Table, cells: Vec<String>) {
    table.add_row(Row::new(cells.iter().map(|s| Cell::new(s)).collect()));
}

/// Add a row whose numeric cells are right-aligned
pub fn add_numeric_row(table: &mut Table, label: &str, values: Vec<String>) {
    let mut cells = vec![Cell::new(label)];
    cells.extend(values.iter().map(|v| Cell::new(v).style_spec("r")));
    table.add_row(Row::new(cells));
}
