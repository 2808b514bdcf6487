//! JSON line-delimited round logs.
//!
//! Operational messages go through `tracing`; this module keeps the durable
//! per-round record used for post-run convergence analysis.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::reinforce::RoundReport;

fn append_json_line<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    serde_json::to_writer(&mut file, value)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    file.write_all(b"\n")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundLogEntry {
    pub timestamp_ms: u64,
    pub report: RoundReport,
}

/// Appends one [`RoundLogEntry`] per round to a JSONL file.
#[derive(Debug, Clone)]
pub struct RoundLogger {
    path: PathBuf,
}

impl RoundLogger {
    /// Create the logger, making the parent directory if needed.
    pub fn new<P: Into<PathBuf>>(path: P) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log_round(&self, report: &RoundReport) -> io::Result<()> {
        let entry = RoundLogEntry {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            report: report.clone(),
        };
        append_json_line(&self.path, &entry)
    }
}
