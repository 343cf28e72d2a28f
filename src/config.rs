use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::board::{
    slot_utils::{parse_time_to_minutes, MINUTES_PER_DAY},
    BoardPolicy, CounterEffect, CounterPolicy, SlotClock, SlotTime,
};

pub const CONFIG_FILE: &str = "duty-board.toml";
const ENV_PREFIX: &str = "DUTY_BOARD__";

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub remote_url: Option<String>,
    pub local_store_dir: Option<PathBuf>,
    pub save_debounce_ms: u64,
    pub static_dir: PathBuf,
    pub counters: CounterPolicy,
    pub clock: SlotClock,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            remote_url: None,
            local_store_dir: Some(PathBuf::from("./data")),
            save_debounce_ms: 500,
            static_dir: PathBuf::from("static"),
            counters: CounterPolicy::default(),
            clock: SlotClock::default(),
        }
    }
}

impl Settings {
    pub fn policy(&self) -> BoardPolicy {
        BoardPolicy {
            counters: self.counters,
            clock: self.clock,
        }
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

/// Shape of `duty-board.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind_addr: Option<String>,
    remote_url: Option<String>,
    local_store_dir: Option<PathBuf>,
    save_debounce_ms: Option<u64>,
    static_dir: Option<PathBuf>,
    counters: Option<CounterPolicy>,
    day_end: Option<String>,
    rollover_start: Option<String>,
    first_slot: Option<String>,
}

/// Defaults, then the toml file at `path` (if readable), then
/// `DUTY_BOARD__*` variables looked up through `env`
pub fn load_settings_from<F>(path: &Path, env: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileConfig>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file"),
        }
    }

    let var = |name: &str| env(&format!("{ENV_PREFIX}{name}"));

    if let Some(v) = var("BIND_ADDR") {
        settings.bind_addr = v;
    }
    if let Some(v) = var("REMOTE_URL") {
        settings.remote_url = non_empty(v);
    }
    if let Some(v) = var("LOCAL_STORE_DIR") {
        settings.local_store_dir = non_empty(v).map(PathBuf::from);
    }
    if let Some(v) = var("SAVE_DEBOUNCE_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.save_debounce_ms = parsed;
        }
    }
    if let Some(v) = var("STATIC_DIR") {
        settings.static_dir = PathBuf::from(v);
    }
    if let Some(v) = var("COUNTER_CEILING") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.counters.ceiling = parsed;
        }
    }
    for (name, slot) in [
        ("RESERVE_COUNTER", &mut settings.counters.reserve),
        ("WEEKEND_COUNTER", &mut settings.counters.weekend),
        ("OTHER_JOBS_COUNTER", &mut settings.counters.other_jobs),
    ] {
        if let Some(effect) = var(name).as_deref().and_then(parse_effect) {
            *slot = effect;
        }
    }
    if let Some(v) = var("DAY_END") {
        if let Some(minutes) = parse_day_end(&v) {
            settings.clock.day_end_minutes = minutes;
        }
    }
    if let Some(v) = var("ROLLOVER_START") {
        if let Some(time) = SlotTime::parse(&v) {
            settings.clock.rollover_start = time;
        }
    }
    if let Some(v) = var("FIRST_SLOT") {
        if let Some(time) = SlotTime::parse(&v) {
            settings.clock.first_slot = time;
        }
    }

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileConfig) {
    if let Some(v) = file_cfg.bind_addr {
        settings.bind_addr = v;
    }
    if let Some(v) = file_cfg.remote_url {
        settings.remote_url = non_empty(v);
    }
    if let Some(v) = file_cfg.local_store_dir {
        settings.local_store_dir = Some(v);
    }
    if let Some(v) = file_cfg.save_debounce_ms {
        settings.save_debounce_ms = v;
    }
    if let Some(v) = file_cfg.static_dir {
        settings.static_dir = v;
    }
    if let Some(v) = file_cfg.counters {
        settings.counters = v;
    }
    if let Some(minutes) = file_cfg.day_end.as_deref().and_then(parse_day_end) {
        settings.clock.day_end_minutes = minutes;
    }
    if let Some(time) = file_cfg.rollover_start.as_deref().and_then(SlotTime::parse) {
        settings.clock.rollover_start = time;
    }
    if let Some(time) = file_cfg.first_slot.as_deref().and_then(SlotTime::parse) {
        settings.clock.first_slot = time;
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Accepts any "HH:MM" plus "24:00" for a midnight rollover
fn parse_day_end(value: &str) -> Option<u16> {
    if value.trim() == "24:00" {
        return Some(MINUTES_PER_DAY);
    }
    parse_time_to_minutes(value).filter(|&m| m > 0)
}

fn parse_effect(value: &str) -> Option<CounterEffect> {
    match value.trim().to_ascii_lowercase().as_str() {
        "increment" => Some(CounterEffect::Increment),
        "reset" => Some(CounterEffect::Reset),
        "keep" => Some(CounterEffect::Keep),
        _ => None,
    }
}
