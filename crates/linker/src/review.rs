//! Manual-review artifact.
//!
//! Deferred ambiguities are written once per run to
//! `<dir>/results-YYYYMMDD-HHMMSS.json`. A second run in the same second
//! gets `-1`, `-2`, ... appended; an existing artifact is never overwritten.
//! If the file cannot be written the same JSON goes to the fallback writer
//! (stdout by default) so the information is not lost, and the error is
//! still returned.

use std::fs::{self, OpenOptions};
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::LinkerError;
use crate::model::DeferredAmbiguity;

/// Destination for deferred ambiguities.
pub trait ReviewSink {
    /// Persist `deferred` and return where it went.
    fn flush(&mut self, deferred: &[DeferredAmbiguity]) -> Result<PathBuf, LinkerError>;
}

/// On-disk shape of the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDocument {
    pub deferred: Vec<DeferredAmbiguity>,
}

#[derive(Serialize)]
struct ReviewDocumentRef<'a> {
    deferred: &'a [DeferredAmbiguity],
}

pub struct ManualReviewSink<W: Write = Stdout> {
    dir: PathBuf,
    fallback: W,
}

impl ManualReviewSink<Stdout> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_fallback(dir, io::stdout())
    }
}

impl<W: Write> ManualReviewSink<W> {
    pub fn with_fallback(dir: impl Into<PathBuf>, fallback: W) -> Self {
        Self {
            dir: dir.into(),
            fallback,
        }
    }

    pub fn into_fallback(self) -> W {
        self.fallback
    }

    pub(crate) fn flush_at(
        &mut self,
        deferred: &[DeferredAmbiguity],
        now: DateTime<Local>,
    ) -> Result<PathBuf, LinkerError> {
        let json = serde_json::to_string_pretty(&ReviewDocumentRef { deferred })?;

        match write_new(&self.dir, now, &json) {
            Ok(path) => {
                tracing::info!(
                    path = %path.display(),
                    count = deferred.len(),
                    "manual review artifact written"
                );
                Ok(path)
            }
            Err(source) => {
                tracing::error!(
                    dir = %self.dir.display(),
                    error = %source,
                    "cannot write manual review artifact, emitting on fallback output"
                );
                // Best effort; the persistence error is what gets reported.
                let _ = writeln!(self.fallback, "{}", json);
                let _ = self.fallback.flush();
                Err(LinkerError::Persistence {
                    dir: self.dir.clone(),
                    source,
                })
            }
        }
    }
}

impl<W: Write> ReviewSink for ManualReviewSink<W> {
    fn flush(&mut self, deferred: &[DeferredAmbiguity]) -> Result<PathBuf, LinkerError> {
        self.flush_at(deferred, Local::now())
    }
}

/// `results-YYYYMMDD-HHMMSS[-n].json`
pub fn artifact_name(now: DateTime<Local>, attempt: u32) -> String {
    let stamp = now.format("%Y%m%d-%H%M%S");
    if attempt == 0 {
        format!("results-{}.json", stamp)
    } else {
        format!("results-{}-{}.json", stamp, attempt)
    }
}

fn write_new(dir: &Path, now: DateTime<Local>, json: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let mut attempt = 0;
    loop {
        let path = dir.join(artifact_name(now, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(json.as_bytes())?;
                file.write_all(b"\n")?;
                file.sync_all()?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}
