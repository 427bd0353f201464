//! Table formatting utilities

use prettytable::{Cell, Row, Table};

/// Create a table with headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).style_spec("b"))
        .collect();
    table.set_titles(Row::new(header_cells));

    table
}

/// Add a row to a table, right-aligning every cell after the first
pub fn add_table_row(table: &mut Table, cells: Vec<String>) {
    let row_cells: Vec<Cell> = cells
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            if i == 0 {
                Cell::new(&s)
            } else {
                Cell::new(&s).style_spec("r")
            }
        })
        .collect();
    table.add_row(Row::new(row_cells));
}
