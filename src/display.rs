use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::board::{Board, Occupant, PoolEntry, PoolKind, ScheduleEntry, TableId};
use crate::table_view::TableView;

/// Formats an occupant as `Surname [color] xN`
pub fn format_occupant(occupant: &Occupant) -> String {
    format!("{} [{}] x{}", occupant.surname, occupant.color.as_str(), occupant.counter)
}

/// One row: time, primary and the "+" occupant when present
pub fn format_row(row: &ScheduleEntry) -> String {
    let primary = row
        .primary()
        .map(|o| format_occupant(&o))
        .unwrap_or_else(|| "[EMPTY]".to_string());
    match row.secondary() {
        Some(secondary) => format!("{} {} + {}", row.time, primary, format_occupant(&secondary)),
        None => format!("{} {}", row.time, primary),
    }
}

fn format_pool_entry(board: &Board, pool: PoolKind, entry: &PoolEntry) -> String {
    let lead = format_occupant(&entry.occupant());
    match board.partner(pool, &entry.id) {
        Some(partner) => format!("{} <-> {}", lead, format_occupant(&partner.occupant())),
        None => lead,
    }
}

/// A table grouped by day, filtered by `query`
pub fn render_table(board: &Board, table: TableId, query: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "** {} **", table.title());
    let groups = TableView::new(table).day_groups(board, query);
    if groups.is_empty() {
        let _ = writeln!(out, "  (no rows)");
    }
    for group in groups {
        let _ = writeln!(out, "  -- {} --", group.date.format("%Y-%m-%d"));
        for row in group.rows {
            let _ = writeln!(out, "  {}", format_row(row));
        }
    }
    out
}

/// A pool with linked pairs shown once, canonical member first
pub fn render_pool(board: &Board, pool: PoolKind, query: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "** {} **", pool.title());
    let entries: Vec<&PoolEntry> = if query.trim().is_empty() {
        board
            .pool(pool)
            .iter()
            .filter(|e| board.is_canonical(pool, &e.id))
            .collect()
    } else {
        let hits = board.search(query.trim());
        let ids: Vec<String> = hits.pool(pool).iter().map(|e| e.id.clone()).collect();
        board.pool(pool).iter().filter(|e| ids.contains(&e.id)).collect()
    };
    if entries.is_empty() {
        let _ = writeln!(out, "  (empty)");
    }
    for entry in entries {
        let _ = writeln!(out, "  {}", format_pool_entry(board, pool, entry));
    }
    out
}

pub fn render_board(board: &Board, query: &str) -> String {
    let mut out = String::new();
    for table in TableId::ALL {
        out.push_str(&render_table(board, table, query));
        out.push('\n');
    }
    for pool in PoolKind::ALL {
        out.push_str(&render_pool(board, pool, query));
        out.push('\n');
    }
    if !board.counters().is_empty() {
        out.push_str("** Counters **\n");
        for (surname, count) in board.counters().iter() {
            let _ = writeln!(out, "  {surname}: {count}");
        }
    }
    out
}

/// Prints the whole board in a readable format
pub fn print_board(board: &Board, query: &str) {
    print!("{}", render_board(board, query));
}

/// Writes the whole board to a text file
pub fn write_board_to_file(board: &Board, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(render_board(board, "").as_bytes())?;
    Ok(())
}
