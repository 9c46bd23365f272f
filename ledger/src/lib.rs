//! Domain rules for plans, subscriptions and listings.
//!
//! Everything here is a pure function of rows already loaded from the
//! database and the current instant, so HTTP handlers and the sweeper share a
//! single definition of what "postable", "overdue" or "approvable" means.

use serde::Serialize;
use uuid::Uuid;

pub mod approval;
pub mod catalog;
pub mod enrollment;
pub mod expiry;
pub mod quota;

#[cfg(test)]
pub(crate) mod fixtures;

/// Result of a best-effort bulk operation.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct BatchOutcome {
    pub applied: Vec<Uuid>,
    pub skipped: Vec<Skipped>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Skipped {
    pub id: Uuid,
    pub name: Option<String>,
    pub reason: String,
}

impl BatchOutcome {
    pub fn apply(&mut self, id: Uuid) {
        self.applied.push(id);
    }

    pub fn skip(&mut self, id: Uuid, name: Option<String>, reason: impl ToString) {
        self.skipped.push(Skipped {
            id,
            name,
            reason: reason.to_string(),
        });
    }

    /// Human-readable warnings, one per skipped item.
    pub fn warnings(&self) -> Vec<String> {
        self.skipped
            .iter()
            .map(|s| match &s.name {
                Some(name) => format!("{} ({}): {}", name, s.id, s.reason),
                None => format!("{}: {}", s.id, s.reason),
            })
            .collect()
    }
}
