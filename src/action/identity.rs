//! # Action Identity
//!
//! An action is identified either by a name (given explicitly, or taken
//! from the executable) or by a standardized business-process step
//! `(process, sequence_id, rank)`. Both forms reduce to a canonical string,
//! and the registry keys entries by the SHA-512 digest of that string, so
//! the same logical action registered from different call sites lands on
//! the same entry. The two canonical forms carry distinct prefixes and can
//! never collide with each other.

use super::executable::Executable;
use crate::schema::BusinessProcess;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::fmt;

/// A standardized business-process step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessStep {
    pub process: String,
    pub sequence_id: u32,
    pub rank: u32,
}

impl ProcessStep {
    pub fn new(process: impl Into<String>, sequence_id: u32, rank: u32) -> Self {
        Self {
            process: process.into().trim().to_string(),
            sequence_id,
            rank,
        }
    }
}

/// How a caller names an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionIdentity {
    Named(String),
    Step(ProcessStep),
}

impl ActionIdentity {
    pub fn named(name: impl Into<String>) -> Self {
        ActionIdentity::Named(name.into().trim().to_string())
    }

    pub fn step(process: impl Into<String>, sequence_id: u32, rank: u32) -> Self {
        ActionIdentity::Step(ProcessStep::new(process, sequence_id, rank))
    }

    /// Member name the action is bound under.
    pub fn resolved_name(&self) -> String {
        match self {
            ActionIdentity::Named(name) => name.clone(),
            ActionIdentity::Step(step) => {
                format!("{}_{}_{}", step.process.trim(), step.sequence_id, step.rank)
            }
        }
    }

    pub fn is_step(&self) -> bool {
        matches!(self, ActionIdentity::Step(_))
    }

    fn canonical(&self) -> String {
        match self {
            ActionIdentity::Named(name) => format!("action:{name}"),
            ActionIdentity::Step(step) => {
                format!("step:{}:{}:{}", step.process.trim(), step.sequence_id, step.rank)
            }
        }
    }

    pub fn key(&self) -> ActionKey {
        let digest = Sha512::digest(self.canonical().as_bytes());
        ActionKey(hex::encode(digest))
    }
}

impl fmt::Display for ActionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolved_name())
    }
}

impl From<&str> for ActionIdentity {
    fn from(name: &str) -> Self {
        ActionIdentity::named(name)
    }
}

impl From<String> for ActionIdentity {
    fn from(name: String) -> Self {
        ActionIdentity::named(name)
    }
}

impl From<ProcessStep> for ActionIdentity {
    fn from(step: ProcessStep) -> Self {
        ActionIdentity::Step(step)
    }
}

impl From<(&str, u32, u32)> for ActionIdentity {
    fn from((process, sequence_id, rank): (&str, u32, u32)) -> Self {
        ActionIdentity::step(process, sequence_id, rank)
    }
}

impl From<(BusinessProcess, u32, u32)> for ActionIdentity {
    fn from((process, sequence_id, rank): (BusinessProcess, u32, u32)) -> Self {
        ActionIdentity::step(process.as_str(), sequence_id, rank)
    }
}

impl From<&Executable> for ActionIdentity {
    fn from(executable: &Executable) -> Self {
        ActionIdentity::named(executable.name())
    }
}

/// Content-derived registry key: hex SHA-512 of the canonical identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionKey(String);

impl ActionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters, for log lines. Keys shorter than that are shown whole.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&ActionIdentity> for ActionKey {
    fn from(identity: &ActionIdentity) -> Self {
        identity.key()
    }
}
