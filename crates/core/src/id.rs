// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record id generation abstractions

use crate::record::RecordId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates unique class record identifiers
pub trait IdGen: Clone + Send + Sync {
    fn next_record_id(&self) -> RecordId;
}

/// UUID-based id generator for production use
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next_record_id(&self) -> RecordId {
        RecordId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Sequential id generator for testing
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("rec")
    }
}

impl IdGen for SequentialIdGen {
    fn next_record_id(&self) -> RecordId {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        RecordId::new(format!("{}-{}", self.prefix, n))
    }
}
