use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;
use crate::gateway::Topic;

// ---------------------------------------------------------------------------
// Request log entry (JSONL)
// ---------------------------------------------------------------------------

/// Gateway operation a log entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    AssessRisk,
    AdviseDiet,
    AdviseExercise,
}

impl Operation {
    /// The advisory operation for a chat topic.
    pub fn advise(topic: Topic) -> Self {
        match topic {
            Topic::Diet => Self::AdviseDiet,
            Topic::Exercise => Self::AdviseExercise,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AssessRisk => "assess_risk",
            Self::AdviseDiet => "advise_diet",
            Self::AdviseExercise => "advise_exercise",
        }
    }
}

/// How a gateway call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Reply received and used as-is.
    Ok,
    /// Reply received but unparseable; the glucose heuristic was used.
    Fallback,
    /// Transport-level failure.
    Error,
}

/// A single entry in the request log (`~/.glycowise/request-log.jsonl`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub timestamp: String,
    pub operation: Operation,
    pub outcome: Outcome,
    pub latency_ms: u64,
    #[serde(default)]
    pub model: String,
    /// Error text for `fallback` and `error` outcomes.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Append-only JSONL request log.
///
/// Writes are best-effort: an I/O failure is reported on stderr and the
/// gateway call carries on.
#[derive(Debug, Clone)]
pub struct RequestLog {
    path: PathBuf,
}

impl RequestLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the configured log path. `None` if `~` cannot be expanded.
    pub fn from_config(config: &LoggingConfig) -> Option<Self> {
        crate::config::expand_path(&config.path).map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry stamped with the current time.
    pub fn record(
        &self,
        operation: Operation,
        outcome: Outcome,
        latency_ms: u64,
        model: &str,
        error: Option<String>,
    ) {
        let entry = RequestLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            operation,
            outcome,
            latency_ms,
            model: model.to_string(),
            error,
        };

        if let Err(e) = append_entry(&self.path, &entry) {
            eprintln!("could not write request log {}: {e}", self.path.display());
        }
    }
}

fn append_entry(path: &Path, entry: &RequestLogEntry) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }

    // One write per line: concurrent appends on O_APPEND must not interleave.
    let mut line = serde_json::to_string(entry)?;
    line.push('\n');

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read every entry from a request log.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries(path: &Path) -> Vec<RequestLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<RequestLogEntry>(&line).ok())
        .collect()
}

/// Read entries from the last `days` days. `None` returns everything.
pub fn read_entries_since_days(path: &Path, days: Option<u32>) -> Vec<RequestLogEntry> {
    let entries = read_all_entries(path);

    let Some(days) = days else {
        return entries;
    };

    let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
    entries
        .into_iter()
        .filter(|e| {
            chrono::DateTime::parse_from_rfc3339(&e.timestamp)
                .map(|ts| ts >= cutoff)
                .unwrap_or(false)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
