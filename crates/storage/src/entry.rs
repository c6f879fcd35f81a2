// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal entry structure with checksum verification
//!
//! Each entry carries a sequence number, timestamp, operation, and a CRC32
//! checksum so replay can detect a torn or corrupted tail.

use crate::journal::JournalError;
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single entry in the operation journal
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Monotonically increasing sequence number
    pub sequence: u64,
    /// Microseconds since Unix epoch
    pub timestamp_micros: u64,
    /// The operation being recorded
    pub operation: Operation,
    /// CRC32 checksum of the serialized operation
    pub checksum: u32,
}

impl JournalEntry {
    /// Create a new entry with computed checksum
    pub fn new(sequence: u64, operation: Operation) -> Self {
        let checksum = Self::calculate_checksum(&operation);
        let timestamp_micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);

        Self {
            sequence,
            timestamp_micros,
            operation,
            checksum,
        }
    }

    /// Create a new entry with a specific timestamp (for testing)
    pub fn new_with_timestamp(sequence: u64, timestamp_micros: u64, operation: Operation) -> Self {
        let checksum = Self::calculate_checksum(&operation);
        Self {
            sequence,
            timestamp_micros,
            operation,
            checksum,
        }
    }

    /// Calculate the CRC32 checksum of the operation
    fn calculate_checksum(operation: &Operation) -> u32 {
        // Operation only contains plain data types and always serializes
        let json = serde_json::to_string(operation).unwrap_or_else(|_| String::new());
        crc32fast::hash(json.as_bytes())
    }

    /// Verify the checksum matches the operation
    pub fn verify(&self) -> bool {
        self.checksum == Self::calculate_checksum(&self.operation)
    }

    /// Serialize to newline-delimited JSON (one line)
    pub fn to_line(&self) -> Result<String, JournalError> {
        serde_json::to_string(self).map_err(JournalError::from)
    }

    /// Parse from a single line of JSON
    pub fn from_line(line: &str) -> Result<Self, JournalError> {
        serde_json::from_str(line).map_err(JournalError::from)
    }
}

impl PartialEq for JournalEntry {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
            && self.timestamp_micros == other.timestamp_micros
            && self.operation == other.operation
            && self.checksum == other.checksum
    }
}

impl Eq for JournalEntry {}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
