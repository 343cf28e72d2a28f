use serde::Serialize;

use super::types::{LinkSession, PoolKind};
use super::Board;

/// Result of a link click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkToggle {
    /// First member picked, waiting for the second
    Opened,
    /// Both members are now linked
    Linked,
    /// Pending link dropped without linking anything
    Cancelled,
    /// Unknown entry, nothing happened
    Ignored,
}

impl Board {
    /// Two-click linking of pool entries.
    ///
    /// The first click anchors a session. A second click on another unlinked
    /// entry of the same pool links the two; a click in another pool, on the
    /// same entry, or on an already linked entry cancels.
    pub fn toggle_link(&mut self, pool: PoolKind, id: &str) -> LinkToggle {
        let Some(session) = self.link.take() else {
            if self.pool_entry(pool, id).is_none() {
                return LinkToggle::Ignored;
            }
            self.link = Some(LinkSession {
                pool,
                id: id.to_string(),
            });
            return LinkToggle::Opened;
        };

        if session.pool != pool || session.id == id {
            return LinkToggle::Cancelled;
        }
        let (Some(first), Some(second)) = (self.pool_entry(pool, &session.id), self.pool_entry(pool, id)) else {
            return LinkToggle::Cancelled;
        };
        if first.linked_id.is_some() || second.linked_id.is_some() {
            return LinkToggle::Cancelled;
        }

        for entry in self.pool_mut(pool).iter_mut() {
            if entry.id == session.id {
                entry.linked_id = Some(id.to_string());
            } else if entry.id == id {
                entry.linked_id = Some(session.id.clone());
            }
        }
        tracing::debug!(?pool, first = %session.id, second = %id, "linked");
        LinkToggle::Linked
    }

    /// Removes the link from both members of the pair containing `id`
    pub fn unlink(&mut self, pool: PoolKind, id: &str) -> bool {
        let Some(linked) = self.pool_entry(pool, id).and_then(|e| e.linked_id.clone()) else {
            return false;
        };
        for entry in self.pool_mut(pool).iter_mut() {
            if entry.id == id || (entry.id == linked && entry.linked_id.as_deref() == Some(id)) {
                entry.linked_id = None;
            }
        }
        true
    }
}
