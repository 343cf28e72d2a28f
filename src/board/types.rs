use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::slot_utils::SlotTime;

/// Category tag attached to every occupant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Pink,
}

/// Display attributes for a color tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorStyle {
    pub label: &'static str,
    pub border: &'static str,
    pub bg: &'static str,
    pub hover: &'static str,
    pub text: &'static str,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Purple,
        Color::Pink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
            Color::Pink => "pink",
        }
    }

    pub fn parse(value: &str) -> Option<Color> {
        let value = value.trim().to_lowercase();
        Color::ALL.iter().copied().find(|c| c.as_str() == value)
    }

    pub fn style(self) -> ColorStyle {
        match self {
            Color::Red => ColorStyle {
                label: "Красный",
                border: "border-red-500",
                bg: "bg-red-50",
                hover: "hover:bg-red-100",
                text: "text-red-700",
            },
            Color::Blue => ColorStyle {
                label: "Синий",
                border: "border-blue-500",
                bg: "bg-blue-50",
                hover: "hover:bg-blue-100",
                text: "text-blue-700",
            },
            Color::Green => ColorStyle {
                label: "Зелёный",
                border: "border-green-500",
                bg: "bg-green-50",
                hover: "hover:bg-green-100",
                text: "text-green-700",
            },
            Color::Yellow => ColorStyle {
                label: "Жёлтый",
                border: "border-yellow-500",
                bg: "bg-yellow-50",
                hover: "hover:bg-yellow-100",
                text: "text-yellow-700",
            },
            Color::Purple => ColorStyle {
                label: "Фиолетовый",
                border: "border-purple-500",
                bg: "bg-purple-50",
                hover: "hover:bg-purple-100",
                text: "text-purple-700",
            },
            Color::Pink => ColorStyle {
                label: "Розовый",
                border: "border-pink-500",
                bg: "bg-pink-50",
                hover: "hover:bg-pink-100",
                text: "text-pink-700",
            },
        }
    }
}

/// Color of a freshly added pool entry
pub const DEFAULT_POOL_COLOR: Color = Color::Blue;
/// Color of an empty primary field
pub const DEFAULT_PRIMARY_COLOR: Color = Color::Red;
/// Color given to a secondary occupant that arrives without one
pub const DEFAULT_SECONDARY_COLOR: Color = Color::Green;

/// The payload that travels between collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub surname: String,
    pub color: Color,
    pub counter: u32,
}

impl Occupant {
    pub fn new(surname: impl Into<String>, color: Color, counter: u32) -> Self {
        Self {
            surname: surname.into(),
            color,
            counter,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.surname.is_empty()
    }
}

/// Which of the two schedule tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TableId {
    Table1,
    Table2,
}

impl TableId {
    pub const ALL: [TableId; 2] = [TableId::Table1, TableId::Table2];

    pub fn id_prefix(self) -> &'static str {
        match self {
            TableId::Table1 => "t1-",
            TableId::Table2 => "t2-",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TableId::Table1 => "ТАБЛИЦА 1",
            TableId::Table2 => "ТАБЛИЦА 2",
        }
    }

    pub fn parse(value: &str) -> Option<TableId> {
        match value {
            "table1" | "data1" | "1" => Some(TableId::Table1),
            "table2" | "data2" | "2" => Some(TableId::Table2),
            _ => None,
        }
    }
}

/// One of the three auxiliary pools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoolKind {
    Reserve,
    Weekend,
    OtherJobs,
}

impl PoolKind {
    pub const ALL: [PoolKind; 3] = [PoolKind::Reserve, PoolKind::Weekend, PoolKind::OtherJobs];

    pub fn id_prefix(self) -> &'static str {
        match self {
            PoolKind::Reserve => "r",
            PoolKind::Weekend => "w",
            PoolKind::OtherJobs => "o",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PoolKind::Reserve => "Резерв",
            PoolKind::Weekend => "Выходные",
            PoolKind::OtherJobs => "Другие работы",
        }
    }

    /// Weekend and other-jobs keep one entry per surname
    pub fn unique_surnames(self) -> bool {
        !matches!(self, PoolKind::Reserve)
    }

    /// Whether entries of this pool may be renamed or recolored in place
    pub fn supports_inline_edit(self) -> bool {
        !matches!(self, PoolKind::Reserve)
    }

    pub fn parse(value: &str) -> Option<PoolKind> {
        match value {
            "reserve" => Some(PoolKind::Reserve),
            "weekend" => Some(PoolKind::Weekend),
            "otherJobs" | "other-jobs" | "other_jobs" => Some(PoolKind::OtherJobs),
            _ => None,
        }
    }
}

/// Primary ("assigned") or secondary ("+") field of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotPosition {
    Primary,
    Secondary,
}

impl SlotPosition {
    pub fn other(self) -> SlotPosition {
        match self {
            SlotPosition::Primary => SlotPosition::Secondary,
            SlotPosition::Secondary => SlotPosition::Primary,
        }
    }
}

/// One schedule-table row, a 15-minute slot on a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    pub date: NaiveDate,
    pub time: SlotTime,
    #[serde(default)]
    pub surname: String,
    #[serde(default = "default_primary_color")]
    pub color: Color,
    #[serde(default)]
    pub counter: u32,
    #[serde(default)]
    pub surname2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color2: Option<Color>,
    #[serde(default)]
    pub counter2: u32,
}

fn default_primary_color() -> Color {
    DEFAULT_PRIMARY_COLOR
}

impl ScheduleEntry {
    pub fn empty(id: impl Into<String>, date: NaiveDate, time: SlotTime) -> Self {
        Self {
            id: id.into(),
            date,
            time,
            surname: String::new(),
            color: DEFAULT_PRIMARY_COLOR,
            counter: 0,
            surname2: String::new(),
            color2: None,
            counter2: 0,
        }
    }

    pub fn primary(&self) -> Option<Occupant> {
        if self.surname.is_empty() {
            return None;
        }
        Some(Occupant::new(self.surname.clone(), self.color, self.counter))
    }

    pub fn secondary(&self) -> Option<Occupant> {
        if self.surname2.is_empty() {
            return None;
        }
        Some(Occupant::new(
            self.surname2.clone(),
            self.color2.unwrap_or(DEFAULT_SECONDARY_COLOR),
            self.counter2,
        ))
    }

    pub fn occupant(&self, position: SlotPosition) -> Option<Occupant> {
        match position {
            SlotPosition::Primary => self.primary(),
            SlotPosition::Secondary => self.secondary(),
        }
    }

    pub fn set_occupant(&mut self, position: SlotPosition, occupant: Occupant) {
        match position {
            SlotPosition::Primary => {
                self.surname = occupant.surname;
                self.color = occupant.color;
                self.counter = occupant.counter;
            }
            SlotPosition::Secondary => {
                self.surname2 = occupant.surname;
                self.color2 = Some(occupant.color);
                self.counter2 = occupant.counter;
            }
        }
    }

    pub fn clear(&mut self, position: SlotPosition) {
        match position {
            SlotPosition::Primary => {
                self.surname.clear();
                self.color = DEFAULT_PRIMARY_COLOR;
                self.counter = 0;
            }
            SlotPosition::Secondary => {
                self.surname2.clear();
                self.color2 = None;
                self.counter2 = 0;
            }
        }
    }

    pub fn is_vacant(&self) -> bool {
        self.surname.is_empty() && self.surname2.is_empty()
    }
}

/// Reserve / weekend / other-jobs item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolEntry {
    pub id: String,
    pub surname: String,
    pub color: Color,
    #[serde(default)]
    pub counter: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_id: Option<String>,
}

impl PoolEntry {
    pub fn new(id: impl Into<String>, occupant: Occupant) -> Self {
        Self {
            id: id.into(),
            surname: occupant.surname,
            color: occupant.color,
            counter: occupant.counter,
            linked_id: None,
        }
    }

    pub fn occupant(&self) -> Occupant {
        Occupant::new(self.surname.clone(), self.color, self.counter)
    }
}

/// Where a drag gesture starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DragSource {
    #[serde(rename_all = "camelCase")]
    Table {
        table: TableId,
        row_id: String,
        slot: SlotPosition,
    },
    #[serde(rename_all = "camelCase")]
    Pool { pool: PoolKind, id: String },
}

/// The active drag gesture, if any
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DragSession {
    #[default]
    None,
    #[serde(rename_all = "camelCase")]
    FromTable {
        table: TableId,
        row_id: String,
        slot: SlotPosition,
        payload: Occupant,
    },
    #[serde(rename_all = "camelCase")]
    FromPool {
        pool: PoolKind,
        id: String,
        payload: Occupant,
    },
}

impl DragSession {
    pub fn is_active(&self) -> bool {
        !matches!(self, DragSession::None)
    }

    pub fn dragged_id(&self) -> Option<&str> {
        match self {
            DragSession::None => None,
            DragSession::FromTable { row_id, .. } => Some(row_id),
            DragSession::FromPool { id, .. } => Some(id),
        }
    }
}

/// A pending link: the first member has been picked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSession {
    pub pool: PoolKind,
    pub id: String,
}

/// Editable fields of rows and pool entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellField {
    Date,
    Time,
    Surname,
    Color,
    Surname2,
    Color2,
}

/// What an edit applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EditTarget {
    Row { table: TableId, id: String },
    Pool { pool: PoolKind, id: String },
}
