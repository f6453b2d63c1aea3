//! # Member Tables
//!
//! Business process components expose named operations. Instead of patching
//! those operations in place, each component owns a [`MemberTable`]: a map
//! from member name to its current [`Executable`] that calling code looks up
//! through. Overriding a member means swapping the table entry.
//!
//! The registry's process-wide namespace is a `MemberTable` too.

use super::executable::{ActionParams, ExecutionFailure, Executable};
use dashmap::DashMap;
use serde_json::Value;

/// Something whose named members can be overridden by the action registry.
pub trait ActionTarget: Send + Sync {
    /// Name of the namespace, recorded on registrations.
    fn namespace(&self) -> &str;

    /// Current executable bound under `name`.
    fn member(&self, name: &str) -> Option<Executable>;

    /// Binds `executable` under `name`, returning the one it replaced.
    fn bind(&self, name: &str, executable: Executable) -> Option<Executable>;
}

/// Indirection table from member name to current handler.
#[derive(Debug)]
pub struct MemberTable {
    namespace: String,
    members: DashMap<String, Executable>,
}

impl MemberTable {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            members: DashMap::new(),
        }
    }

    /// Adds a member, for building a table up front.
    pub fn with_member(self, name: impl Into<String>, executable: Executable) -> Self {
        self.members.insert(name.into(), executable);
        self
    }

    /// Calls the member bound under `name`; `None` if nothing is bound.
    pub fn call(
        &self,
        name: &str,
        params: &ActionParams,
    ) -> Option<Result<Value, ExecutionFailure>> {
        // Clone out so the handler runs without holding the shard lock.
        let executable = self.member(name)?;
        Some(executable.call(params))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.members.iter().map(|m| m.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl ActionTarget for MemberTable {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn member(&self, name: &str) -> Option<Executable> {
        self.members.get(name).map(|m| m.value().clone())
    }

    fn bind(&self, name: &str, executable: Executable) -> Option<Executable> {
        self.members.insert(name.to_string(), executable)
    }
}
