use std::fs::File;
use std::io;
use std::path::Path;

use csv::WriterBuilder;

use crate::board::{Board, TableId};

pub const CSV_HEADER: [&str; 9] = [
    "id", "date", "time", "surname", "color", "counter", "surname2", "color2", "counter2",
];

/// Writes one table as CSV, one record per slot in table order
pub fn export_table_to_csv<W: io::Write>(board: &Board, table: TableId, writer: W) -> Result<(), csv::Error> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for row in board.table(table) {
        let date = row.date.format("%Y-%m-%d").to_string();
        let time = row.time.to_string();
        let counter = row.counter.to_string();
        let color2 = row.color2.map(|c| c.as_str()).unwrap_or_default();
        let counter2 = row.counter2.to_string();
        wtr.write_record([
            row.id.as_str(),
            date.as_str(),
            time.as_str(),
            row.surname.as_str(),
            row.color.as_str(),
            counter.as_str(),
            row.surname2.as_str(),
            color2,
            counter2.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn export_table_to_path(board: &Board, table: TableId, path: &Path) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    export_table_to_csv(board, table, file)
}

pub fn export_table_to_string(board: &Board, table: TableId) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    export_table_to_csv(board, table, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
