//! Structured JSON-lines logging for the scoring engine.
//!
//! One object per line on stdout, optionally mirrored to
//! `$LOG_DIR/events.jsonl`. Level comes from `LOG_LEVEL`, domain filtering
//! from `LOG_DOMAINS` (comma-separated or "all").

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use chrono::Utc;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("debug") => Level::Debug,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

/// Log categories for filtering one subsystem at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Provider,  // remote match-data fetches
    Assign,    // auto-assignment of picks
    Scoring,   // outcome evaluation, lives
    Cleanup,   // finished-match eviction
    Lifecycle, // cycle orchestration
    Metrics,   // per-cycle counters
    System,    // startup, shutdown
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Provider => "provider",
            Domain::Assign => "assign",
            Domain::Scoring => "scoring",
            Domain::Cleanup => "cleanup",
            Domain::Lifecycle => "lifecycle",
            Domain::Metrics => "metrics",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static EVENTS_FILE: OnceLock<Option<Mutex<BufWriter<File>>>> = OnceLock::new();

fn events_file() -> &'static Option<Mutex<BufWriter<File>>> {
    EVENTS_FILE.get_or_init(|| {
        let base = std::env::var("LOG_DIR").ok()?;
        let mut path = PathBuf::from(base);
        if let Err(err) = create_dir_all(&path) {
            eprintln!("[log] failed to create log dir: {}", err);
            return None;
        }
        path.push("events.jsonl");
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(f) => Some(Mutex::new(BufWriter::new(f))),
            Err(err) => {
                eprintln!("[log] failed to open events log: {}", err);
                None
            }
        }
    })
}

/// RFC3339 timestamp with milliseconds.
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Emit a structured log entry.
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }

    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("seq".to_string(), json!(LOG_SEQ.fetch_add(1, Ordering::SeqCst)));
    entry.insert("lvl".to_string(), json!(level.as_str()));
    entry.insert("domain".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("data".to_string(), Value::Object(fields));

    let line = Value::Object(entry).to_string();
    if let Some(file) = events_file() {
        if let Ok(mut w) = file.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
    println!("{}", line);
}

// Field helpers so call sites stay terse.

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num<T: Into<f64>>(n: T) -> Value {
    json!(n.into())
}
