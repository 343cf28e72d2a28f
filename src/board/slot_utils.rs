use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::types::ScheduleEntry;

pub const MINUTES_PER_DAY: u16 = 24 * 60;
pub const SLOT_MINUTES: u16 = 15;

/// Parses a time string (HH:MM) to minutes since midnight
pub fn parse_time_to_minutes(time_str: &str) -> Option<u16> {
    let (hours, minutes) = time_str.trim().split_once(':')?;
    let hours: u16 = hours.parse().ok()?;
    let minutes: u16 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight to time string (HH:MM)
pub fn minutes_to_time_string(minutes: u16) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours % 24, mins)
}

/// Time of day of a slot, stored as minutes since midnight.
/// Serialized as "HH:MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(u16);

impl SlotTime {
    pub fn from_minutes(minutes: u16) -> Option<SlotTime> {
        (minutes < MINUTES_PER_DAY).then_some(SlotTime(minutes))
    }

    pub fn hm(hours: u16, minutes: u16) -> Option<SlotTime> {
        if minutes >= 60 {
            return None;
        }
        SlotTime::from_minutes(hours * 60 + minutes)
    }

    pub fn parse(value: &str) -> Option<SlotTime> {
        parse_time_to_minutes(value).map(SlotTime)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&minutes_to_time_string(self.0))
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SlotTime::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid slot time '{raw}'")))
    }
}

/// Decides where the slot after a given one falls.
///
/// Times advance by 15 minutes. Once the next time reaches `day_end_minutes`
/// the date moves to the following day and the time restarts at
/// `rollover_start`. A `day_end_minutes` of 1440 is the plain midnight rollover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotClock {
    pub day_end_minutes: u16,
    pub rollover_start: SlotTime,
    pub first_slot: SlotTime,
}

impl Default for SlotClock {
    fn default() -> Self {
        Self {
            day_end_minutes: 18 * 60,
            rollover_start: SlotTime(0),
            first_slot: SlotTime(9 * 60),
        }
    }
}

impl SlotClock {
    pub fn midnight() -> Self {
        Self {
            day_end_minutes: MINUTES_PER_DAY,
            ..Self::default()
        }
    }

    /// Date and time of the slot that follows `(date, time)`
    pub fn next_slot(&self, date: NaiveDate, time: SlotTime) -> (NaiveDate, SlotTime) {
        let next = time.minutes() + SLOT_MINUTES;
        if next >= self.day_end_minutes.min(MINUTES_PER_DAY) {
            let next_date = date.checked_add_days(Days::new(1)).unwrap_or(date);
            (next_date, self.rollover_start)
        } else {
            (date, SlotTime(next))
        }
    }

    /// Slot to append after the last row, or the first slot of `today`
    pub fn after_last(&self, rows: &[ScheduleEntry], today: NaiveDate) -> (NaiveDate, SlotTime) {
        match rows.last() {
            Some(last) => self.next_slot(last.date, last.time),
            None => (today, self.first_slot),
        }
    }
}

/// Every quarter hour of a day, the choices offered when editing a time
pub fn generate_time_slots() -> Vec<SlotTime> {
    (0..MINUTES_PER_DAY)
        .step_by(SLOT_MINUTES as usize)
        .map(SlotTime)
        .collect()
}

/// Empty working-day slots (09:00 to 17:45) for three days from `start`
pub fn generate_three_days(start: NaiveDate, mut next_id: impl FnMut() -> String) -> Vec<ScheduleEntry> {
    let mut rows = Vec::with_capacity(3 * 36);
    for day in 0..3 {
        let date = start.checked_add_days(Days::new(day)).unwrap_or(start);
        for minutes in (9 * 60..18 * 60).step_by(SLOT_MINUTES as usize) {
            rows.push(ScheduleEntry::empty(next_id(), date, SlotTime(minutes)));
        }
    }
    rows
}
