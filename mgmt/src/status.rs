// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Status reported by the operator

use std::fmt::Display;

/// The status of the unit, with a human readable reason when not active
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UnitStatus {
    /// The operator is doing something on its own
    Maintenance(String),
    /// Waiting for something that will happen without intervention
    Waiting(String),
    /// Waiting for an action of the administrator
    Blocked(String),
    Active,
}

impl UnitStatus {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            UnitStatus::Maintenance(_) => "maintenance",
            UnitStatus::Waiting(_) => "waiting",
            UnitStatus::Blocked(_) => "blocked",
            UnitStatus::Active => "active",
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            UnitStatus::Maintenance(msg) | UnitStatus::Waiting(msg) | UnitStatus::Blocked(msg) => {
                msg
            }
            UnitStatus::Active => "",
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, UnitStatus::Active)
    }
}

impl Default for UnitStatus {
    fn default() -> Self {
        UnitStatus::Maintenance("Initializing".to_string())
    }
}

impl Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitStatus::Active => write!(f, "{}", self.name()),
            _ => write!(f, "{}: {}", self.name(), self.message()),
        }
    }
}
