//! Typed results of migration, sync and maintenance runs.

use super::error::SyncError;
use super::verify::VerifyReport;
use crate::models::{EntityKind, RecordError};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    RelationalToDocument,
    DocumentToRelational,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelationalToDocument => f.write_str("sqlite -> mongodb"),
            Self::DocumentToRelational => f.write_str("mongodb -> sqlite"),
        }
    }
}

/// Why a record was intentionally not copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Failed validation at the store boundary.
    Invalid(RecordError),
    /// The owning user does not exist on the destination side.
    UnresolvedUser(String),
    /// The destination already holds this record.
    AlreadyPresent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(e) => write!(f, "invalid record: {e}"),
            Self::UnresolvedUser(user) => write!(f, "unresolved user '{user}'"),
            Self::AlreadyPresent => f.write_str("already present"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub key: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failed {
    pub key: String,
    pub error: String,
}

/// Outcome of one entity step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub entity: EntityKind,
    pub direction: Direction,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: u64,
    pub skipped: Vec<Skipped>,
    pub failed: Vec<Failed>,
    /// Set when the step stopped early; records it did not reach are not listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl StepReport {
    #[must_use]
    pub const fn new(entity: EntityKind, direction: Direction) -> Self {
        Self {
            entity,
            direction,
            inserted: 0,
            updated: 0,
            deleted: 0,
            skipped: Vec::new(),
            failed: Vec::new(),
            aborted: None,
        }
    }

    pub fn skip(&mut self, key: impl Into<String>, reason: SkipReason) {
        let key = key.into();
        match &reason {
            SkipReason::AlreadyPresent => {}
            reason => warn!("Skipping {} {}: {}", self.entity, key, reason),
        }
        self.skipped.push(Skipped { key, reason });
    }

    pub fn fail(&mut self, key: impl Into<String>, error: impl fmt::Display) {
        let key = key.into();
        let error = error.to_string();
        warn!("Failed to copy {} {}: {}", self.entity, key, error);
        self.failed.push(Failed { key, error });
    }

    pub fn abort(&mut self, error: &SyncError) {
        warn!("{} step aborted: {}", self.entity, error);
        self.aborted = Some(error.to_string());
    }

    #[must_use]
    pub const fn succeeded(&self) -> usize {
        self.inserted + self.updated
    }

    /// No record failed and the step ran to completion. Skips don't count.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.aborted.is_none() && self.failed.is_empty()
    }

    pub fn log(&self) {
        info!(
            "{} ({}): {} inserted, {} updated, {} deleted, {} skipped, {} failed{}",
            self.entity,
            self.direction,
            self.inserted,
            self.updated,
            self.deleted,
            self.skipped.len(),
            self.failed.len(),
            if self.aborted.is_some() { ", aborted" } else { "" }
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Migrate,
    Sync,
    Maintain,
}

/// Every step of one invocation, in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub operation: Operation,
    pub steps: Vec<StepReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerifyReport>,
}

impl RunReport {
    #[must_use]
    pub const fn new(operation: Operation) -> Self {
        Self {
            operation,
            steps: Vec::new(),
            verification: None,
        }
    }

    #[must_use]
    pub fn step(&self, entity: EntityKind) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.entity == entity)
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(StepReport::is_clean)
    }

    /// 0 when every step is clean, 2 on any abort or failed record.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        if self.is_clean() { 0 } else { 2 }
    }
}
