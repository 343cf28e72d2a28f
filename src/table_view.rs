//! Presentation state of one schedule table.
//!
//! A `TableView` never changes the board on its own: every gesture is
//! forwarded to the `Board`, and a drop always ends the drag session
//! whether or not it changed anything.

use chrono::NaiveDate;
use serde::Serialize;

use crate::board::{
    Board, CellField, DragSource, EditTarget, ScheduleEntry, SlotPosition, TableId,
};

/// Part of a row, from the top, where a drop still targets the row itself
pub const DRAG_OVER_THRESHOLD: f32 = 0.7;

/// The cell being edited and the text typed so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditingCell {
    pub row_id: String,
    pub field: CellField,
    pub buffer: String,
}

/// Rows of one day, in table order
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    pub rows: Vec<&'a ScheduleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    table: TableId,
    editing: Option<EditingCell>,
    drag_over: Option<String>,
    drag_over_secondary: Option<String>,
}

impl TableView {
    pub fn new(table: TableId) -> Self {
        Self {
            table,
            editing: None,
            drag_over: None,
            drag_over_secondary: None,
        }
    }

    pub fn table(&self) -> TableId {
        self.table
    }

    pub fn editing(&self) -> Option<&EditingCell> {
        self.editing.as_ref()
    }

    pub fn drag_over(&self) -> Option<&str> {
        self.drag_over.as_deref()
    }

    pub fn drag_over_secondary(&self) -> Option<&str> {
        self.drag_over_secondary.as_deref()
    }

    /// Rows matching `query` (all rows when it is blank), grouped by date.
    /// Groups follow the first appearance of each date in the table.
    pub fn day_groups<'a>(&self, board: &'a Board, query: &str) -> Vec<DayGroup<'a>> {
        let needle = query.trim().to_lowercase();
        let mut groups: Vec<DayGroup<'a>> = Vec::new();
        for row in board.table(self.table) {
            if !needle.is_empty() && !crate::board::row_matches(row, &needle) {
                continue;
            }
            match groups.iter_mut().find(|g| g.date == row.date) {
                Some(group) => group.rows.push(row),
                None => groups.push(DayGroup {
                    date: row.date,
                    rows: vec![row],
                }),
            }
        }
        groups
    }

    pub fn start_drag(&mut self, board: &mut Board, row_id: &str, slot: SlotPosition) -> bool {
        board.begin_drag(DragSource::Table {
            table: self.table,
            row_id: row_id.to_string(),
            slot,
        })
    }

    /// Pointer moved over a row; `fraction` is its vertical position within
    /// the row (0.0 top, 1.0 bottom)
    pub fn drag_over_row(&mut self, row_id: &str, fraction: f32) {
        self.drag_over_secondary = None;
        self.drag_over = (fraction < DRAG_OVER_THRESHOLD).then(|| row_id.to_string());
    }

    pub fn drag_over_secondary_cell(&mut self, row_id: &str) {
        self.drag_over = None;
        self.drag_over_secondary = Some(row_id.to_string());
    }

    pub fn drag_leave(&mut self) {
        self.drag_over = None;
        self.drag_over_secondary = None;
    }

    pub fn drop_on_row(&mut self, board: &mut Board, row_id: &str) -> bool {
        self.finish_drop(board, row_id, false)
    }

    pub fn drop_on_secondary(&mut self, board: &mut Board, row_id: &str) -> bool {
        self.finish_drop(board, row_id, true)
    }

    fn finish_drop(&mut self, board: &mut Board, row_id: &str, to_secondary: bool) -> bool {
        let changed = board.complete_drop_on_slot(self.table, row_id, to_secondary);
        board.end_drag();
        self.drag_leave();
        changed
    }

    /// Opens a cell for editing with its current text in the buffer
    pub fn begin_edit(&mut self, board: &Board, row_id: &str, field: CellField) -> bool {
        let Some(row) = board.row(self.table, row_id) else {
            return false;
        };
        self.editing = Some(EditingCell {
            row_id: row_id.to_string(),
            field,
            buffer: cell_text(row, field),
        });
        true
    }

    pub fn update_buffer(&mut self, text: &str) {
        if let Some(editing) = self.editing.as_mut() {
            editing.buffer = text.to_string();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Writes the buffer to the board and closes the editor
    pub fn commit_edit(&mut self, board: &mut Board) -> bool {
        let Some(editing) = self.editing.take() else {
            return false;
        };
        let target = EditTarget::Row {
            table: self.table,
            id: editing.row_id,
        };
        board.edit_cell(&target, editing.field, &editing.buffer)
    }

    pub fn delete_row(&mut self, board: &mut Board, row_id: &str) -> bool {
        if self.editing.as_ref().is_some_and(|e| e.row_id == row_id) {
            self.editing = None;
        }
        board.delete_schedule_row(self.table, row_id)
    }

    pub fn add_row(&mut self, board: &mut Board) -> String {
        board.add_schedule_row(self.table)
    }
}

/// Current text of a cell, as shown in its editor
pub fn cell_text(row: &ScheduleEntry, field: CellField) -> String {
    match field {
        CellField::Date => row.date.format("%Y-%m-%d").to_string(),
        CellField::Time => row.time.to_string(),
        CellField::Surname => row.surname.clone(),
        CellField::Color => row.color.as_str().to_string(),
        CellField::Surname2 => row.surname2.clone(),
        CellField::Color2 => row.color2.map(|c| c.as_str().to_string()).unwrap_or_default(),
    }
}
