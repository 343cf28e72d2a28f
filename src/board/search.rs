use chrono::NaiveDate;
use serde::Serialize;

use super::slot_utils::SlotTime;
use super::types::{Color, PoolEntry, PoolKind, ScheduleEntry, SlotPosition, TableId};
use super::{is_canonical_in, Board};

/// Entries of every collection that match a query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub table1: Vec<ScheduleEntry>,
    pub table2: Vec<ScheduleEntry>,
    pub reserve: Vec<PoolEntry>,
    pub weekend: Vec<PoolEntry>,
    pub other_jobs: Vec<PoolEntry>,
}

impl SearchResults {
    pub fn table(&self, table: TableId) -> &[ScheduleEntry] {
        match table {
            TableId::Table1 => &self.table1,
            TableId::Table2 => &self.table2,
        }
    }

    pub fn pool(&self, pool: PoolKind) -> &[PoolEntry] {
        match pool {
            PoolKind::Reserve => &self.reserve,
            PoolKind::Weekend => &self.weekend,
            PoolKind::OtherJobs => &self.other_jobs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.table1.is_empty()
            && self.table2.is_empty()
            && self.reserve.is_empty()
            && self.weekend.is_empty()
            && self.other_jobs.is_empty()
    }
}

/// One surname occurrence, flattened for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurnameRecord {
    pub id: String,
    pub surname: String,
    pub date: Option<NaiveDate>,
    pub time: Option<SlotTime>,
    pub color: Color,
    pub counter: u32,
    pub linked_id: Option<String>,
}

pub(crate) fn matches(surname: &str, needle: &str) -> bool {
    surname.to_lowercase().contains(needle)
}

pub(crate) fn row_matches(row: &ScheduleEntry, needle: &str) -> bool {
    matches(&row.surname, needle) || (!row.surname2.is_empty() && matches(&row.surname2, needle))
}

impl Board {
    /// Case-insensitive substring search over every collection.
    ///
    /// Rows match on either occupant. A linked pool pair is listed once,
    /// through its canonical member.
    pub fn search(&self, query: &str) -> SearchResults {
        let needle = query.to_lowercase();
        let rows = |table: TableId| -> Vec<ScheduleEntry> {
            self.table(table)
                .iter()
                .filter(|r| row_matches(r, &needle))
                .cloned()
                .collect()
        };
        let pool_hits = |pool: PoolKind| -> Vec<PoolEntry> {
            let entries = self.pool(pool);
            entries
                .iter()
                .filter(|e| matches(&e.surname, &needle) && is_canonical_in(entries, &e.id))
                .cloned()
                .collect()
        };
        SearchResults {
            table1: rows(TableId::Table1),
            table2: rows(TableId::Table2),
            reserve: pool_hits(PoolKind::Reserve),
            weekend: pool_hits(PoolKind::Weekend),
            other_jobs: pool_hits(PoolKind::OtherJobs),
        }
    }

    /// Every named occupant of the tables and pools, optionally limited to
    /// one date. Pool entries carry no date and are left out when filtering.
    pub fn surnames(&self, date: Option<NaiveDate>) -> Vec<SurnameRecord> {
        let mut records = Vec::new();
        for table in TableId::ALL {
            for row in self.table(table) {
                if date.is_some_and(|d| d != row.date) {
                    continue;
                }
                for position in [SlotPosition::Primary, SlotPosition::Secondary] {
                    if let Some(occupant) = row.occupant(position) {
                        records.push(SurnameRecord {
                            id: row.id.clone(),
                            surname: occupant.surname,
                            date: Some(row.date),
                            time: Some(row.time),
                            color: occupant.color,
                            counter: occupant.counter,
                            linked_id: None,
                        });
                    }
                }
            }
        }
        if date.is_none() {
            for pool in PoolKind::ALL {
                records.extend(self.pool(pool).iter().map(|e| SurnameRecord {
                    id: e.id.clone(),
                    surname: e.surname.clone(),
                    date: None,
                    time: None,
                    color: e.color,
                    counter: e.counter,
                    linked_id: e.linked_id.clone(),
                }));
            }
        }
        records
    }
}
