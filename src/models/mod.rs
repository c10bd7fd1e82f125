//! Store-agnostic entity records.
//!
//! Every row or document crossing a store boundary is converted into one of
//! these typed records first. A row or document that cannot be converted is
//! quarantined with a [`RecordError`] instead of being copied half-formed.

pub mod activity;
pub mod application;
pub mod assignment;
pub mod branch;
pub mod goods;
pub mod user;

pub use activity::{ActivityRecord, UserRef};
pub use application::ApplicationRecord;
pub use assignment::AssignmentRecord;
pub use branch::BranchRecord;
pub use goods::GoodsRecord;
pub use user::UserRecord;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Validation failures at a store boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid value for '{field}': {value}")]
    InvalidField { field: &'static str, value: String },
}

/// The six entity types; each maps to a table and a collection of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Users,
    Branches,
    Goods,
    Assignments,
    UserActivities,
    CustomerApplications,
}

impl EntityKind {
    pub const ALL: [Self; 6] = [
        Self::Users,
        Self::Branches,
        Self::Goods,
        Self::Assignments,
        Self::UserActivities,
        Self::CustomerApplications,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Branches => "branches",
            Self::Goods => "goods",
            Self::Assignments => "assignments",
            Self::UserActivities => "user_activities",
            Self::CustomerApplications => "customer_applications",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declares a closed string enum with `as_str` and a case-insensitive `FromStr`.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $field:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = RecordError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(RecordError::InvalidField {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(Role, "role" {
    Admin => "admin",
    Employee => "employee",
    Customer => "customer",
});

string_enum!(
    /// Transitions between statuses are unconstrained.
    AssignmentStatus, "status" {
    Pending => "pending",
    InProgress => "in_progress",
    Completed => "completed",
});

string_enum!(Priority, "priority" {
    Low => "low",
    Medium => "medium",
    High => "high",
});

string_enum!(ApplicationStatus, "status" {
    Pending => "pending",
    UnderReview => "under_review",
    Approved => "approved",
    Rejected => "rejected",
});
