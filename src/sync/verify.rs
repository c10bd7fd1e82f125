//! Count reconciliation between the two stores.
//!
//! Read-only. Mismatches are reported, never repaired.

use crate::db::Store;
use crate::document::DocumentStore;
use crate::models::EntityKind;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub entity: EntityKind,
    pub relational: Option<u64>,
    pub document: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CountRow {
    /// Both counts known and equal.
    #[must_use]
    pub fn matches(&self) -> bool {
        self.error.is_none() && self.relational.is_some() && self.relational == self.document
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub rows: Vec<CountRow>,
}

impl VerifyReport {
    pub fn mismatches(&self) -> impl Iterator<Item = &CountRow> {
        self.rows.iter().filter(|r| !r.matches())
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.mismatches().next().is_none()
    }

    #[must_use]
    pub fn row(&self, entity: EntityKind) -> Option<&CountRow> {
        self.rows.iter().find(|r| r.entity == entity)
    }

    /// Exit code for `verify`: mismatches only matter under `--strict`.
    #[must_use]
    pub fn exit_code(&self, strict: bool) -> u8 {
        if strict && !self.is_consistent() { 2 } else { 0 }
    }

    pub fn log(&self) {
        for row in &self.rows {
            let show = |n: Option<u64>| n.map_or_else(|| "?".to_string(), |n| n.to_string());
            if row.matches() {
                info!(
                    "{}: sqlite={} mongodb={}",
                    row.entity,
                    show(row.relational),
                    show(row.document)
                );
            } else {
                warn!(
                    "{}: sqlite={} mongodb={} MISMATCH{}",
                    row.entity,
                    show(row.relational),
                    show(row.document),
                    row.error
                        .as_deref()
                        .map(|e| format!(" ({e})"))
                        .unwrap_or_default()
                );
            }
        }
    }
}

/// Counts every entity type in both stores. A failing count is recorded on
/// its row and the remaining types are still counted.
pub async fn verify<D>(store: &Store, documents: &D) -> VerifyReport
where
    D: DocumentStore + ?Sized,
{
    let mut rows = Vec::with_capacity(EntityKind::ALL.len());

    for entity in EntityKind::ALL {
        let mut errors = Vec::new();

        let relational = match store.count(entity).await {
            Ok(n) => Some(n),
            Err(e) => {
                errors.push(format!("sqlite: {e}"));
                None
            }
        };
        let document = match documents.count(entity).await {
            Ok(n) => Some(n),
            Err(e) => {
                errors.push(format!("mongodb: {e}"));
                None
            }
        };

        rows.push(CountRow {
            entity,
            relational,
            document,
            error: (!errors.is_empty()).then(|| errors.join("; ")),
        });
    }

    let report = VerifyReport { rows };
    report.log();
    report
}
