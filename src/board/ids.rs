use std::collections::HashMap;

/// Hands out sequential ids per prefix ("r", "w", "o", "t1-", "t2-").
///
/// Counters only grow, so an id is never reissued after its entry is deleted.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: HashMap<&'static str, u64>,
}

impl IdAllocator {
    pub fn allocate(&mut self, prefix: &'static str) -> String {
        let counter = self.next.entry(prefix).or_insert(1);
        let id = format!("{prefix}{counter}");
        *counter += 1;
        id
    }

    /// Makes sure later allocations sort after an id that already exists
    pub fn observe(&mut self, prefix: &'static str, id: &str) {
        let Some(n) = id.strip_prefix(prefix).and_then(|s| s.parse::<u64>().ok()) else {
            return;
        };
        let counter = self.next.entry(prefix).or_insert(1);
        if *counter <= n {
            *counter = n + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_per_prefix() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.allocate("r"), "r1");
        assert_eq!(ids.allocate("r"), "r2");
        assert_eq!(ids.allocate("w"), "w1");
        assert_eq!(ids.allocate("t1-"), "t1-1");
    }

    #[test]
    fn observe_skips_past_existing_ids() {
        let mut ids = IdAllocator::default();
        ids.observe("r", "r7");
        ids.observe("r", "r3");
        ids.observe("r", "t1-99");
        ids.observe("t1-", "t1-1712345");
        assert_eq!(ids.allocate("r"), "r8");
        assert_eq!(ids.allocate("t1-"), "t1-1712346");
    }
}
