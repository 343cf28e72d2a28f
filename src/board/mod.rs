//! The scheduling board: two slot tables, three pools, and the drag/link
//! session state that moves surnames between them.
//!
//! Every operation is total. Input that refers to nothing (an unknown id,
//! a drop without a drag, an empty surname) leaves the board untouched and
//! reports `false`.

pub mod counters;
pub mod ids;
pub mod slot_utils;
pub mod types;

mod drag;
mod link;
mod rows;
mod search;

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::store::BoardSnapshot;

pub use counters::{CounterEffect, CounterPolicy, SurnameCounters};
pub use ids::IdAllocator;
pub use link::LinkToggle;
pub use search::{SearchResults, SurnameRecord};
pub(crate) use search::row_matches;
pub use slot_utils::{SlotClock, SlotTime};
pub use types::{
    CellField, Color, DragSession, DragSource, EditTarget, LinkSession, Occupant, PoolEntry,
    PoolKind, ScheduleEntry, SlotPosition, TableId,
};

/// Tunable behavior that differed between deployments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardPolicy {
    pub counters: CounterPolicy,
    pub clock: SlotClock,
}

#[derive(Debug, Clone)]
pub struct Board {
    table1: Vec<ScheduleEntry>,
    table2: Vec<ScheduleEntry>,
    reserve: Vec<PoolEntry>,
    weekend: Vec<PoolEntry>,
    other_jobs: Vec<PoolEntry>,
    counters: SurnameCounters,
    drag: DragSession,
    link: Option<LinkSession>,
    ids: IdAllocator,
    policy: BoardPolicy,
    today: NaiveDate,
}

impl Board {
    /// An empty board. `today` dates the first row of an empty table.
    pub fn new(today: NaiveDate, policy: BoardPolicy) -> Self {
        Self {
            table1: Vec::new(),
            table2: Vec::new(),
            reserve: Vec::new(),
            weekend: Vec::new(),
            other_jobs: Vec::new(),
            counters: SurnameCounters::default(),
            drag: DragSession::None,
            link: None,
            ids: IdAllocator::default(),
            policy,
            today,
        }
    }

    /// A board whose tables hold three empty working days starting at `today`
    pub fn seeded(today: NaiveDate, policy: BoardPolicy) -> Self {
        let mut board = Board::new(today, policy);
        for table in TableId::ALL {
            let ids = &mut board.ids;
            let rows = slot_utils::generate_three_days(today, || ids.allocate(table.id_prefix()));
            *board.table_mut(table) = rows;
        }
        board
    }

    pub fn table(&self, table: TableId) -> &[ScheduleEntry] {
        match table {
            TableId::Table1 => &self.table1,
            TableId::Table2 => &self.table2,
        }
    }

    fn table_mut(&mut self, table: TableId) -> &mut Vec<ScheduleEntry> {
        match table {
            TableId::Table1 => &mut self.table1,
            TableId::Table2 => &mut self.table2,
        }
    }

    pub fn pool(&self, pool: PoolKind) -> &[PoolEntry] {
        match pool {
            PoolKind::Reserve => &self.reserve,
            PoolKind::Weekend => &self.weekend,
            PoolKind::OtherJobs => &self.other_jobs,
        }
    }

    fn pool_mut(&mut self, pool: PoolKind) -> &mut Vec<PoolEntry> {
        match pool {
            PoolKind::Reserve => &mut self.reserve,
            PoolKind::Weekend => &mut self.weekend,
            PoolKind::OtherJobs => &mut self.other_jobs,
        }
    }

    pub fn row(&self, table: TableId, id: &str) -> Option<&ScheduleEntry> {
        self.table(table).iter().find(|r| r.id == id)
    }

    pub fn pool_entry(&self, pool: PoolKind, id: &str) -> Option<&PoolEntry> {
        self.pool(pool).iter().find(|e| e.id == id)
    }

    pub fn counters(&self) -> &SurnameCounters {
        &self.counters
    }

    pub fn drag_session(&self) -> &DragSession {
        &self.drag
    }

    pub fn link_session(&self) -> Option<&LinkSession> {
        self.link.as_ref()
    }

    pub fn policy(&self) -> &BoardPolicy {
        &self.policy
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// The linked partner of a pool entry, if the link resolves
    pub fn partner(&self, pool: PoolKind, id: &str) -> Option<&PoolEntry> {
        partner_in(self.pool(pool), id)
    }

    /// Whether `id` is shown first for its pair (always true when unlinked)
    pub fn is_canonical(&self, pool: PoolKind, id: &str) -> bool {
        is_canonical_in(self.pool(pool), id)
    }

    pub fn to_snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            data1: Some(self.table1.clone()),
            data2: Some(self.table2.clone()),
            reserve: Some(self.reserve.clone()),
            weekend: Some(self.weekend.clone()),
            other_jobs: Some(self.other_jobs.clone()),
            surname_counters: Some(self.counters.clone()),
        }
    }

    /// Replaces every collection present in `snapshot`; absent keys keep
    /// their current contents. Transient sessions are dropped.
    pub fn apply_snapshot(&mut self, snapshot: BoardSnapshot) {
        if let Some(rows) = snapshot.data1 {
            self.table1 = rows;
        }
        if let Some(rows) = snapshot.data2 {
            self.table2 = rows;
        }
        if let Some(entries) = snapshot.reserve {
            self.reserve = entries;
        }
        if let Some(entries) = snapshot.weekend {
            self.weekend = entries;
        }
        if let Some(entries) = snapshot.other_jobs {
            self.other_jobs = entries;
        }
        if let Some(counters) = snapshot.surname_counters {
            self.counters = counters;
        }

        for pool in PoolKind::ALL {
            repair_links(self.pool_mut(pool));
        }
        self.reseed_ids();
        self.drag = DragSession::None;
        self.link = None;
    }

    fn reseed_ids(&mut self) {
        for table in TableId::ALL {
            let prefix = table.id_prefix();
            let ids: Vec<String> = self.table(table).iter().map(|r| r.id.clone()).collect();
            for id in ids {
                self.ids.observe(prefix, &id);
            }
        }
        for pool in PoolKind::ALL {
            let prefix = pool.id_prefix();
            let ids: Vec<String> = self.pool(pool).iter().map(|e| e.id.clone()).collect();
            for id in ids {
                self.ids.observe(prefix, &id);
            }
        }
    }

    /// Appends one entry with a fresh id
    fn push_single(&mut self, pool: PoolKind, occupant: Occupant) -> String {
        let id = self.ids.allocate(pool.id_prefix());
        self.pool_mut(pool).push(PoolEntry::new(id.clone(), occupant));
        id
    }

    /// Appends two mutually linked entries with fresh ids, `first` before `second`
    fn push_pair(&mut self, pool: PoolKind, first: Occupant, second: Occupant) -> (String, String) {
        let id1 = self.ids.allocate(pool.id_prefix());
        let id2 = self.ids.allocate(pool.id_prefix());
        let mut a = PoolEntry::new(id1.clone(), first);
        let mut b = PoolEntry::new(id2.clone(), second);
        a.linked_id = Some(id2.clone());
        b.linked_id = Some(id1.clone());
        let entries = self.pool_mut(pool);
        entries.push(a);
        entries.push(b);
        (id1, id2)
    }

    /// Sends occupants that are leaving the tables to the reserve with their
    /// counters bumped. Two occupants arrive as a linked pair.
    fn evict_to_reserve(&mut self, occupants: Vec<Occupant>) {
        let ceiling = self.policy.counters.ceiling;
        let mut bumped: Vec<Occupant> = occupants
            .into_iter()
            .filter(|o| !o.is_empty())
            .map(|mut o| {
                o.counter = self.counters.bump(&o.surname, ceiling);
                o
            })
            .collect();
        match bumped.len() {
            0 => {}
            1 => {
                let only = bumped.remove(0);
                tracing::debug!(surname = %only.surname, "evicted to reserve");
                self.push_single(PoolKind::Reserve, only);
            }
            _ => {
                let second = bumped.remove(1);
                let first = bumped.remove(0);
                tracing::debug!(first = %first.surname, second = %second.surname, "evicted pair to reserve");
                self.push_pair(PoolKind::Reserve, first, second);
            }
        }
    }

    /// Removes matching entries from a pool and unlinks whoever was paired
    /// with them
    fn remove_pool_entries<F>(&mut self, pool: PoolKind, mut matches: F)
    where
        F: FnMut(&PoolEntry) -> bool,
    {
        let entries = self.pool_mut(pool);
        let removed: HashSet<String> = entries
            .iter()
            .filter(|e| matches(e))
            .map(|e| e.id.clone())
            .collect();
        if removed.is_empty() {
            return;
        }
        entries.retain(|e| !removed.contains(&e.id));
        for entry in entries.iter_mut() {
            if entry.linked_id.as_ref().is_some_and(|l| removed.contains(l)) {
                entry.linked_id = None;
            }
        }
    }
}

pub(crate) fn partner_in<'a>(entries: &'a [PoolEntry], id: &str) -> Option<&'a PoolEntry> {
    let entry = entries.iter().find(|e| e.id == id)?;
    let linked = entry.linked_id.as_deref()?;
    entries
        .iter()
        .find(|e| e.id == linked && e.linked_id.as_deref() == Some(id))
}

/// A red member leads its pair; otherwise the earlier entry does
pub(crate) fn is_canonical_in(entries: &[PoolEntry], id: &str) -> bool {
    let Some(partner) = partner_in(entries, id) else {
        return true;
    };
    let Some((pos, entry)) = entries.iter().enumerate().find(|(_, e)| e.id == id) else {
        return true;
    };
    let entry_red = entry.color == Color::Red;
    let partner_red = partner.color == Color::Red;
    if entry_red != partner_red {
        return entry_red;
    }
    let partner_pos = entries
        .iter()
        .position(|e| e.id == partner.id)
        .unwrap_or(usize::MAX);
    pos < partner_pos
}

/// Drops links that are one-sided, dangling, or self-referencing
pub(crate) fn repair_links(entries: &mut [PoolEntry]) {
    let pairs: Vec<(String, Option<String>)> = entries
        .iter()
        .map(|e| (e.id.clone(), e.linked_id.clone()))
        .collect();
    for entry in entries.iter_mut() {
        let Some(linked) = entry.linked_id.clone() else {
            continue;
        };
        let mutual = linked != entry.id
            && pairs
                .iter()
                .any(|(id, back)| *id == linked && back.as_deref() == Some(entry.id.as_str()));
        if !mutual {
            tracing::warn!(id = %entry.id, linked = %linked, "dropping one-sided link");
            entry.linked_id = None;
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn board() -> Board {
        Board::new(date("2025-01-20"), BoardPolicy::default())
    }

    pub fn links_are_mutual(board: &Board) -> bool {
        PoolKind::ALL.iter().all(|&pool| {
            let entries = board.pool(pool);
            entries.iter().all(|e| match &e.linked_id {
                None => true,
                Some(l) => entries
                    .iter()
                    .any(|p| p.id == *l && p.linked_id.as_deref() == Some(e.id.as_str())),
            })
        })
    }

    pub fn reserve_with(board: &mut Board, names: &[(&str, Color)]) -> Vec<String> {
        names
            .iter()
            .map(|(n, c)| board.push_single(PoolKind::Reserve, Occupant::new(*n, *c, 0)))
            .collect()
    }

    pub fn push_pair(board: &mut Board, pool: PoolKind, a: (&str, Color), b: (&str, Color)) -> (String, String) {
        board.push_pair(pool, Occupant::new(a.0, a.1, 0), Occupant::new(b.0, b.1, 0))
    }
}
