use serde::{Deserialize, Serialize};

use crate::board::{PoolEntry, ScheduleEntry, SurnameCounters};

/// The persisted shape of a board. Every key is optional: stores may hold
/// only part of it, and loading keeps whatever is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data1: Option<Vec<ScheduleEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data2: Option<Vec<ScheduleEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve: Option<Vec<PoolEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend: Option<Vec<PoolEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_jobs: Option<Vec<PoolEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname_counters: Option<SurnameCounters>,
}

/// Keys of the snapshot, as used by blob stores
pub const SNAPSHOT_KEYS: [&str; 6] = [
    "data1",
    "data2",
    "reserve",
    "weekend",
    "otherJobs",
    "surnameCounters",
];

/// Body of a save request to the remote store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub data: BoardSnapshot,
}

impl BoardSnapshot {
    pub fn is_empty(&self) -> bool {
        self.data1.is_none()
            && self.data2.is_none()
            && self.reserve.is_none()
            && self.weekend.is_none()
            && self.other_jobs.is_none()
            && self.surname_counters.is_none()
    }

    /// Fills every key missing here from `fallback`
    pub fn or(self, fallback: BoardSnapshot) -> BoardSnapshot {
        BoardSnapshot {
            data1: self.data1.or(fallback.data1),
            data2: self.data2.or(fallback.data2),
            reserve: self.reserve.or(fallback.reserve),
            weekend: self.weekend.or(fallback.weekend),
            other_jobs: self.other_jobs.or(fallback.other_jobs),
            surname_counters: self.surname_counters.or(fallback.surname_counters),
        }
    }

    /// Splits the snapshot into one JSON value per present key
    pub fn to_blobs(&self) -> Result<Vec<(&'static str, serde_json::Value)>, serde_json::Error> {
        let value = serde_json::to_value(self)?;
        let mut blobs = Vec::new();
        if let serde_json::Value::Object(map) = value {
            for key in SNAPSHOT_KEYS {
                if let Some(blob) = map.get(key) {
                    blobs.push((key, blob.clone()));
                }
            }
        }
        Ok(blobs)
    }

    /// Reassembles a snapshot from per-key JSON values
    pub fn from_blobs<I>(blobs: I) -> Result<BoardSnapshot, serde_json::Error>
    where
        I: IntoIterator<Item = (&'static str, serde_json::Value)>,
    {
        let map: serde_json::Map<String, serde_json::Value> = blobs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_object_leaves_missing_keys_empty() {
        let snapshot: BoardSnapshot = serde_json::from_str(
            r#"{"reserve":[{"id":"r1","surname":"Ivanov","color":"red","counter":2}],"surnameCounters":{"Ivanov":2}}"#,
        )
        .unwrap();
        assert!(snapshot.data1.is_none());
        assert_eq!(snapshot.reserve.as_ref().unwrap()[0].counter, 2);
        assert_eq!(snapshot.surname_counters.as_ref().unwrap().get("Ivanov"), 2);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let snapshot: BoardSnapshot = serde_json::from_str(r#"{"surnames":[],"total":0}"#).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn or_prefers_self() {
        let remote = BoardSnapshot {
            weekend: Some(vec![]),
            ..Default::default()
        };
        let local: BoardSnapshot =
            serde_json::from_str(r#"{"weekend":[{"id":"w1","surname":"A","color":"blue"}],"otherJobs":[]}"#).unwrap();
        let merged = remote.or(local);
        assert_eq!(merged.weekend, Some(vec![]));
        assert_eq!(merged.other_jobs, Some(vec![]));
        assert!(merged.reserve.is_none());
    }

    #[test]
    fn blobs_use_wire_keys() {
        let snapshot: BoardSnapshot = serde_json::from_str(r#"{"otherJobs":[],"surnameCounters":{}}"#).unwrap();
        let blobs = snapshot.to_blobs().unwrap();
        let keys: Vec<&str> = blobs.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["otherJobs", "surnameCounters"]);
        assert_eq!(BoardSnapshot::from_blobs(blobs).unwrap(), snapshot);
    }
}
