//! Per-pass resolution context
//!
//! Carries the caller's options and the pass clock through one extraction.

use std::time::{Duration, Instant};

/// Context for one resolution pass
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// Attach the raw attribute table dump to the record
    pub include_raw_table: bool,

    started_at: Instant,
}

impl ResolveContext {
    /// Start a new pass clock
    pub fn new() -> Self {
        Self {
            include_raw_table: false,
            started_at: Instant::now(),
        }
    }

    /// Request the raw attribute table dump
    pub const fn with_raw_table(mut self, include: bool) -> Self {
        self.include_raw_table = include;
        self
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new()
    }
}
