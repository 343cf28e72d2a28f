use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::PoolKind;

/// What arriving in a pool does to a surname's counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterEffect {
    Increment,
    Reset,
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterPolicy {
    pub ceiling: u32,
    pub reserve: CounterEffect,
    pub weekend: CounterEffect,
    pub other_jobs: CounterEffect,
}

impl Default for CounterPolicy {
    fn default() -> Self {
        Self {
            ceiling: 9,
            reserve: CounterEffect::Increment,
            weekend: CounterEffect::Increment,
            other_jobs: CounterEffect::Increment,
        }
    }
}

impl CounterPolicy {
    pub fn effect_for(&self, pool: PoolKind) -> CounterEffect {
        match pool {
            PoolKind::Reserve => self.reserve,
            PoolKind::Weekend => self.weekend,
            PoolKind::OtherJobs => self.other_jobs,
        }
    }
}

/// Occurrence count per surname, shared by the whole board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurnameCounters(BTreeMap<String, u32>);

impl SurnameCounters {
    pub fn get(&self, surname: &str) -> u32 {
        self.0.get(surname).copied().unwrap_or(0)
    }

    /// Adds one, saturating at `ceiling`, and returns the new value
    pub fn bump(&mut self, surname: &str, ceiling: u32) -> u32 {
        let next = self.get(surname).saturating_add(1).min(ceiling);
        self.0.insert(surname.to_string(), next);
        next
    }

    pub fn apply(&mut self, surname: &str, effect: CounterEffect, ceiling: u32) -> u32 {
        match effect {
            CounterEffect::Increment => self.bump(surname, ceiling),
            CounterEffect::Reset => {
                self.0.insert(surname.to_string(), 0);
                0
            }
            CounterEffect::Keep => self.get(surname),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
