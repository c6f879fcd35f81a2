// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only operation journal
//!
//! Newline-delimited JSON entries, fsynced on every append. Replay stops at
//! the first unparseable or checksum-failing line: everything after a torn
//! write is unreachable anyway, and truncation is left to the operator.

use crate::entry::JournalEntry;
use crate::operation::Operation;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

/// Errors from journal operations
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only journal of durable operations
pub struct Journal {
    file: File,
    sequence: u64,
}

impl Journal {
    /// Open or create a journal at the given path
    ///
    /// The next sequence number continues after the last valid entry.
    pub fn open(path: &Path) -> Result<Self, JournalError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;

        let sequence = Self::replay(path)?
            .last()
            .map(|entry| entry.sequence)
            .unwrap_or(0);

        Ok(Self { file, sequence })
    }

    /// Append an operation to the journal
    pub fn append(&mut self, op: &Operation) -> Result<u64, JournalError> {
        self.sequence += 1;
        let entry = JournalEntry::new(self.sequence, op.clone());
        writeln!(self.file, "{}", entry.to_line()?)?;
        self.file.sync_all()?;
        Ok(self.sequence)
    }

    /// Get the current sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Replay all valid entries from the journal
    pub fn replay(path: &Path) -> Result<Vec<JournalEntry>, JournalError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let entry = match JournalEntry::from_line(&line) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(?e, "stopping journal replay at unparseable entry");
                    break;
                }
            };
            if !entry.verify() {
                tracing::warn!(
                    sequence = entry.sequence,
                    "stopping journal replay at checksum mismatch"
                );
                break;
            }
            entries.push(entry);
        }

        Ok(entries)
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
