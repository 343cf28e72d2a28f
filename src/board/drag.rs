use super::types::{
    DragSession, DragSource, Occupant, PoolKind, SlotPosition, TableId,
};
use super::{partner_in, Board};

/// What a drag carries: the dragged occupant, plus the one travelling with it
#[derive(Debug, Clone)]
struct Carried {
    lead: Occupant,
    partner: Option<Occupant>,
}

/// How a drop onto a table row is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotDrop {
    /// Move the dragged row to the target's position in the same table
    Reorder,
    /// Copy the payload into the target row's fields
    Assign,
}

impl Board {
    /// Starts a drag gesture. Returns false (and leaves no session) when the
    /// source does not exist.
    pub fn begin_drag(&mut self, source: DragSource) -> bool {
        self.drag = self.session_for(source);
        self.drag.is_active()
    }

    fn session_for(&self, source: DragSource) -> DragSession {
        match source {
            DragSource::Table { table, row_id, slot } => {
                let Some(row) = self.row(table, &row_id) else {
                    return DragSession::None;
                };
                let payload = match slot {
                    // An empty primary can still be dragged to reorder rows
                    SlotPosition::Primary => row
                        .primary()
                        .unwrap_or_else(|| Occupant::new("", row.color, row.counter)),
                    SlotPosition::Secondary => match row.secondary() {
                        Some(occupant) => occupant,
                        None => return DragSession::None,
                    },
                };
                DragSession::FromTable {
                    table,
                    row_id,
                    slot,
                    payload,
                }
            }
            DragSource::Pool { pool, id } => match self.pool_entry(pool, &id) {
                Some(entry) => DragSession::FromPool {
                    pool,
                    payload: entry.occupant(),
                    id,
                },
                None => DragSession::None,
            },
        }
    }

    /// Clears the drag session whether or not anything was dropped
    pub fn end_drag(&mut self) {
        self.drag = DragSession::None;
    }

    /// Reads what the active drag carries from the live collections
    fn carried(&self) -> Option<Carried> {
        match &self.drag {
            DragSession::None => None,
            DragSession::FromTable {
                table, row_id, slot, ..
            } => {
                let row = self.row(*table, row_id)?;
                match slot {
                    SlotPosition::Primary => Some(Carried {
                        lead: row.primary()?,
                        partner: row.secondary(),
                    }),
                    SlotPosition::Secondary => Some(Carried {
                        lead: row.secondary()?,
                        partner: None,
                    }),
                }
            }
            DragSession::FromPool { pool, id, .. } => {
                let entries = self.pool(*pool);
                let entry = entries.iter().find(|e| e.id == *id)?;
                if entry.surname.is_empty() {
                    return None;
                }
                Some(Carried {
                    lead: entry.occupant(),
                    partner: partner_in(entries, id).map(|p| p.occupant()),
                })
            }
        }
    }

    /// Takes the dragged entity out of its source collection. Slots are
    /// vacated, never removed.
    fn vacate_source(&mut self) {
        match self.drag.clone() {
            DragSession::None => {}
            DragSession::FromTable {
                table, row_id, slot, ..
            } => {
                if let Some(row) = self.table_mut(table).iter_mut().find(|r| r.id == row_id) {
                    match slot {
                        SlotPosition::Primary => {
                            row.clear(SlotPosition::Primary);
                            row.clear(SlotPosition::Secondary);
                        }
                        SlotPosition::Secondary => row.clear(SlotPosition::Secondary),
                    }
                }
            }
            DragSession::FromPool { pool, id, .. } => {
                let partner = partner_in(self.pool(pool), &id).map(|p| p.id.clone());
                self.remove_pool_entries(pool, |e| e.id == id || Some(&e.id) == partner.as_ref());
            }
        }
    }

    /// Drops the dragged entity into a pool.
    ///
    /// Linked pool pairs and slot pairs arrive as a linked pair under fresh
    /// ids. Each transferred surname's counter follows the destination
    /// pool's counter effect.
    pub fn complete_drop_on_pool(&mut self, target: PoolKind) -> bool {
        if let DragSession::FromPool { pool, .. } = &self.drag {
            if *pool == target {
                return false;
            }
        }
        let Some(carried) = self.carried() else {
            return false;
        };
        let from_table = matches!(self.drag, DragSession::FromTable { .. });

        let (first, second) = match (&self.drag, carried.partner) {
            (DragSession::FromPool { pool, id, .. }, Some(partner)) => {
                // keep the source's insertion order for the pair
                let entries = self.pool(*pool);
                let lead_pos = entries.iter().position(|e| e.id == *id);
                let partner_pos = self
                    .partner(*pool, id)
                    .and_then(|p| entries.iter().position(|e| e.id == p.id));
                if partner_pos < lead_pos {
                    (partner, Some(carried.lead))
                } else {
                    (carried.lead, Some(partner))
                }
            }
            (_, partner) => (carried.lead, partner),
        };

        self.vacate_source();

        let arriving: Vec<String> = std::iter::once(&first)
            .chain(second.as_ref())
            .map(|o| o.surname.clone())
            .collect();
        if target.unique_surnames() {
            self.remove_pool_entries(target, |e| arriving.contains(&e.surname));
            if from_table {
                self.remove_pool_entries(PoolKind::Reserve, |e| arriving.contains(&e.surname));
            }
        }

        let effect = self.policy.counters.effect_for(target);
        let ceiling = self.policy.counters.ceiling;
        let mut settle = |occupant: Occupant| -> Occupant {
            let counter = self.counters.apply(&occupant.surname, effect, ceiling);
            Occupant { counter, ..occupant }
        };
        let first = settle(first);
        let second = second.map(&mut settle);

        match second {
            Some(second) => {
                tracing::debug!(pool = ?target, first = %first.surname, second = %second.surname, "pair dropped on pool");
                self.push_pair(target, first, second);
            }
            None => {
                tracing::debug!(pool = ?target, surname = %first.surname, "dropped on pool");
                self.push_single(target, first);
            }
        }
        self.drag = DragSession::None;
        true
    }

    /// Picks reorder or assign for a drop onto a table row.
    ///
    /// A row dragged by its primary field within its own table reorders.
    /// Any other drop assigns, including a "+" badge dragged within the table.
    fn slot_drop_kind(&self, table: TableId, to_secondary: bool) -> SlotDrop {
        match &self.drag {
            DragSession::FromTable {
                table: source,
                slot: SlotPosition::Primary,
                ..
            } if *source == table && !to_secondary => SlotDrop::Reorder,
            _ => SlotDrop::Assign,
        }
    }

    /// Drops the dragged entity on a row of `table`, either into the primary
    /// field or the secondary ("+") cell.
    pub fn complete_drop_on_slot(
        &mut self,
        table: TableId,
        target_row_id: &str,
        to_secondary: bool,
    ) -> bool {
        if !self.drag.is_active() || self.row(table, target_row_id).is_none() {
            return false;
        }
        let changed = match self.slot_drop_kind(table, to_secondary) {
            SlotDrop::Reorder => self.reorder_rows(table, target_row_id),
            SlotDrop::Assign => self.assign_to_slot(table, target_row_id, to_secondary),
        };
        if changed {
            self.drag = DragSession::None;
        }
        changed
    }

    fn reorder_rows(&mut self, table: TableId, target_row_id: &str) -> bool {
        let Some(dragged_id) = self.drag.dragged_id().map(str::to_string) else {
            return false;
        };
        if dragged_id == target_row_id {
            return false;
        }
        let rows = self.table_mut(table);
        let (Some(from), Some(to)) = (
            rows.iter().position(|r| r.id == dragged_id),
            rows.iter().position(|r| r.id == target_row_id),
        ) else {
            return false;
        };
        let moved = rows.remove(from);
        rows.insert(to.min(rows.len()), moved);
        tracing::debug!(?table, from, to, "reordered row");
        true
    }

    fn assign_to_slot(&mut self, table: TableId, target_row_id: &str, to_secondary: bool) -> bool {
        if let DragSession::FromTable { row_id, .. } = &self.drag {
            if row_id == target_row_id {
                return false;
            }
        }
        let Some(carried) = self.carried() else {
            return false;
        };

        let chosen = if to_secondary {
            SlotPosition::Secondary
        } else {
            SlotPosition::Primary
        };
        let placements: Vec<(SlotPosition, Occupant)> = match (&self.drag, carried.partner) {
            // a linked pool pair is co-located in both fields of the slot
            (DragSession::FromPool { .. }, Some(partner)) => {
                vec![(chosen, carried.lead), (chosen.other(), partner)]
            }
            // a slot pair keeps its primary/secondary arrangement
            (DragSession::FromTable { .. }, Some(partner)) => vec![
                (SlotPosition::Primary, carried.lead),
                (SlotPosition::Secondary, partner),
            ],
            _ => vec![(chosen, carried.lead)],
        };

        self.vacate_source();

        let Some(target) = self
            .table_mut(table)
            .iter_mut()
            .find(|r| r.id == target_row_id)
        else {
            return false;
        };
        let displaced: Vec<Occupant> = placements
            .iter()
            .filter_map(|(position, _)| target.occupant(*position))
            .collect();
        for (position, occupant) in placements {
            target.set_occupant(position, occupant);
        }
        tracing::debug!(?table, row = %target_row_id, "assigned to slot");

        self.evict_to_reserve(displaced);
        true
    }
}
