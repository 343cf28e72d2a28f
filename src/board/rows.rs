use chrono::NaiveDate;

use super::slot_utils::SlotTime;
use super::types::{
    CellField, Color, DragSession, EditTarget, Occupant, PoolKind, ScheduleEntry, TableId,
    DEFAULT_POOL_COLOR, DEFAULT_SECONDARY_COLOR,
};
use super::Board;

impl Board {
    /// Adds a surname to a pool. Blank names are rejected.
    pub fn add_pool_entry(&mut self, pool: PoolKind, surname: &str) -> Option<String> {
        let surname = surname.trim();
        if surname.is_empty() {
            return None;
        }
        let id = self.push_single(pool, Occupant::new(surname, DEFAULT_POOL_COLOR, 0));
        tracing::debug!(?pool, %id, surname, "added pool entry");
        Some(id)
    }

    /// Appends an empty slot 15 minutes after the table's last row
    pub fn add_schedule_row(&mut self, table: TableId) -> String {
        let (date, time) = self.policy.clock.after_last(self.table(table), self.today);
        let id = self.ids.allocate(table.id_prefix());
        self.table_mut(table)
            .push(ScheduleEntry::empty(id.clone(), date, time));
        id
    }

    /// Removes a row, sending its occupants to the reserve, and appends a
    /// fresh empty row so the table keeps its length.
    pub fn delete_schedule_row(&mut self, table: TableId, id: &str) -> bool {
        let rows = self.table_mut(table);
        let Some(index) = rows.iter().position(|r| r.id == id) else {
            return false;
        };
        let removed = rows.remove(index);

        let occupants: Vec<Occupant> = [removed.primary(), removed.secondary()]
            .into_iter()
            .flatten()
            .collect();
        self.evict_to_reserve(occupants);

        if let DragSession::FromTable { row_id, .. } = &self.drag {
            if row_id == id {
                self.drag = DragSession::None;
            }
        }
        let replacement = self.add_schedule_row(table);
        tracing::debug!(?table, deleted = %id, %replacement, "deleted row");
        true
    }

    /// Overwrites one field of a row or pool entry.
    ///
    /// Values that don't parse for the field (dates, times, colors) and
    /// fields the target doesn't have are ignored.
    pub fn edit_cell(&mut self, target: &EditTarget, field: CellField, value: &str) -> bool {
        match target {
            EditTarget::Row { table, id } => {
                let Some(row) = self.table_mut(*table).iter_mut().find(|r| r.id == *id) else {
                    return false;
                };
                edit_row(row, field, value)
            }
            EditTarget::Pool { pool, id } => {
                if !pool.supports_inline_edit() {
                    return false;
                }
                // weekend and other-jobs hold one entry per surname
                if field == CellField::Surname
                    && pool.unique_surnames()
                    && self.pool(*pool).iter().any(|e| e.id != *id && e.surname == value)
                {
                    return false;
                }
                let Some(entry) = self.pool_mut(*pool).iter_mut().find(|e| e.id == *id) else {
                    return false;
                };
                match field {
                    CellField::Surname => {
                        entry.surname = value.to_string();
                        true
                    }
                    CellField::Color => match Color::parse(value) {
                        Some(color) => {
                            entry.color = color;
                            true
                        }
                        None => false,
                    },
                    _ => false,
                }
            }
        }
    }
}

fn edit_row(row: &mut ScheduleEntry, field: CellField, value: &str) -> bool {
    match field {
        CellField::Date => match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
            Ok(date) => row.date = date,
            Err(_) => return false,
        },
        CellField::Time => match SlotTime::parse(value) {
            Some(time) => row.time = time,
            None => return false,
        },
        CellField::Surname => row.surname = value.to_string(),
        CellField::Color => match Color::parse(value) {
            Some(color) => row.color = color,
            None => return false,
        },
        CellField::Surname2 => {
            row.surname2 = value.to_string();
            if !value.is_empty() && row.color2.is_none() {
                row.color2 = Some(DEFAULT_SECONDARY_COLOR);
            }
        }
        CellField::Color2 => match Color::parse(value) {
            Some(color) => row.color2 = Some(color),
            None => return false,
        },
    }
    true
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::types::SlotPosition;
    use super::*;

    #[test]
    fn add_pool_entry_trims_and_rejects_blank() {
        let mut board = board();
        assert_eq!(board.add_pool_entry(PoolKind::Reserve, "  Ivanov "), Some("r1".to_string()));
        assert_eq!(board.add_pool_entry(PoolKind::Reserve, "   "), None);
        let entry = &board.pool(PoolKind::Reserve)[0];
        assert_eq!(entry.surname, "Ivanov");
        assert_eq!(entry.color, Color::Blue);
        assert_eq!(entry.counter, 0);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut board = board();
        board.add_pool_entry(PoolKind::Weekend, "A");
        board.add_pool_entry(PoolKind::Weekend, "B");
        board.remove_pool_entries(PoolKind::Weekend, |e| e.id == "w2");
        assert_eq!(board.add_pool_entry(PoolKind::Weekend, "C"), Some("w3".to_string()));
    }

    #[test]
    fn first_row_of_empty_table_is_today_nine() {
        let mut board = board();
        board.add_schedule_row(TableId::Table1);
        let row = &board.table(TableId::Table1)[0];
        assert_eq!(row.date, date("2025-01-20"));
        assert_eq!(row.time.to_string(), "09:00");
        assert!(row.is_vacant());
    }

    #[test]
    fn add_row_rolls_over_to_next_day() {
        let mut board = board();
        board.add_schedule_row(TableId::Table2);
        board.edit_cell(
            &EditTarget::Row { table: TableId::Table2, id: "t2-1".into() },
            CellField::Time,
            "17:45",
        );
        board.add_schedule_row(TableId::Table2);
        let last = board.table(TableId::Table2).last().unwrap();
        assert_eq!(last.date, date("2025-01-21"));
        assert_eq!(last.time.to_string(), "00:00");
    }

    #[test]
    fn delete_evicts_pair_and_keeps_row_count() {
        let mut board = board();
        for _ in 0..3 {
            board.add_schedule_row(TableId::Table1);
        }
        let row = board.table_mut(TableId::Table1).iter_mut().find(|r| r.id == "t1-2").unwrap();
        row.set_occupant(SlotPosition::Primary, Occupant::new("Ivanov", Color::Red, 0));
        row.set_occupant(SlotPosition::Secondary, Occupant::new("Petrov", Color::Blue, 0));

        assert!(board.delete_schedule_row(TableId::Table1, "t1-2"));
        assert_eq!(board.table(TableId::Table1).len(), 3);
        assert!(board.row(TableId::Table1, "t1-2").is_none());

        let reserve = board.pool(PoolKind::Reserve);
        assert_eq!(reserve.len(), 2);
        assert_eq!(reserve[0].surname, "Ivanov");
        assert_eq!(reserve[0].counter, 1);
        assert_eq!(reserve[1].linked_id.as_deref(), Some(reserve[0].id.as_str()));
        assert!(links_are_mutual(&board));
    }

    #[test]
    fn delete_of_secondary_only_row_evicts_one() {
        let mut board = board();
        board.add_schedule_row(TableId::Table1);
        board.edit_cell(
            &EditTarget::Row { table: TableId::Table1, id: "t1-1".into() },
            CellField::Surname2,
            "Petrov",
        );
        assert!(board.delete_schedule_row(TableId::Table1, "t1-1"));
        let reserve = board.pool(PoolKind::Reserve);
        assert_eq!(reserve.len(), 1);
        assert_eq!(reserve[0].color, Color::Green);
        assert_eq!(reserve[0].linked_id, None);
    }

    #[test]
    fn delete_counter_saturates() {
        let mut board = board();
        board.policy.counters.ceiling = 2;
        board.add_schedule_row(TableId::Table1);
        for _ in 0..4 {
            let id = board.table(TableId::Table1)[0].id.clone();
            board.edit_cell(&EditTarget::Row { table: TableId::Table1, id: id.clone() }, CellField::Surname, "Ivanov");
            board.delete_schedule_row(TableId::Table1, &id);
        }
        assert_eq!(board.counters().get("Ivanov"), 2);
        assert!(board.pool(PoolKind::Reserve).iter().all(|e| e.counter <= 2));
    }

    #[test]
    fn delete_unknown_row_is_noop() {
        let mut board = board();
        board.add_schedule_row(TableId::Table1);
        assert!(!board.delete_schedule_row(TableId::Table1, "t2-1"));
        assert_eq!(board.table(TableId::Table1).len(), 1);
    }

    #[test]
    fn edit_surname2_defaults_color2() {
        let mut board = board();
        board.add_schedule_row(TableId::Table1);
        let target = EditTarget::Row { table: TableId::Table1, id: "t1-1".into() };
        assert!(board.edit_cell(&target, CellField::Surname2, "Petrov"));
        assert_eq!(board.row(TableId::Table1, "t1-1").unwrap().color2, Some(Color::Green));

        assert!(board.edit_cell(&target, CellField::Color2, "pink"));
        assert!(board.edit_cell(&target, CellField::Surname2, "Sidorov"));
        assert_eq!(board.row(TableId::Table1, "t1-1").unwrap().color2, Some(Color::Pink));

        assert!(!board.edit_cell(&target, CellField::Color, "teal"));
        assert!(!board.edit_cell(&target, CellField::Date, "yesterday"));
        assert!(board.edit_cell(&target, CellField::Date, "2025-02-01"));
    }

    #[test]
    fn pool_inline_edit_only_where_supported() {
        let mut board = board();
        board.add_pool_entry(PoolKind::Reserve, "Ivanov");
        board.add_pool_entry(PoolKind::OtherJobs, "Petrov");
        let reserve = EditTarget::Pool { pool: PoolKind::Reserve, id: "r1".into() };
        let other = EditTarget::Pool { pool: PoolKind::OtherJobs, id: "o1".into() };

        assert!(!board.edit_cell(&reserve, CellField::Surname, "X"));
        assert!(board.edit_cell(&other, CellField::Surname, "Petrova"));
        assert!(board.edit_cell(&other, CellField::Color, "yellow"));
        assert!(!board.edit_cell(&other, CellField::Time, "10:00"));
        assert_eq!(board.pool(PoolKind::OtherJobs)[0].surname, "Petrova");
        assert_eq!(board.pool(PoolKind::OtherJobs)[0].color, Color::Yellow);
    }

    #[test]
    fn pool_rename_cannot_duplicate_a_surname() {
        let mut board = board();
        board.add_pool_entry(PoolKind::Weekend, "Ivanov");
        board.add_pool_entry(PoolKind::Weekend, "Petrov");
        let petrov = EditTarget::Pool { pool: PoolKind::Weekend, id: "w2".into() };

        assert!(!board.edit_cell(&petrov, CellField::Surname, "Ivanov"));
        assert_eq!(board.pool(PoolKind::Weekend)[1].surname, "Petrov");
        // renaming to its own name is fine
        assert!(board.edit_cell(&petrov, CellField::Surname, "Petrov"));
    }
}
