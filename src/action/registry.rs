//! # Action Registry
//!
//! Process-wide table from [`ActionKey`] to the executable currently
//! registered for that action, with the history of the executables it
//! superseded.
//!
//! ## Registration Rules
//!
//! - An existing key is left alone unless `force` is set. Re-registering is
//!   silent and adds no history.
//! - With a target, the executable is bound on the target under the
//!   resolved name. A member the target already had is archived first.
//! - Without a target, a named action is bound into the registry's global
//!   [`MemberTable`]. That path mutates shared state outside the
//!   registry's own bookkeeping and is refused unless the registry was
//!   built with [`allow_global_rebinding`](ActionRegistry::allow_global_rebinding).
//! - Without a target, a process step is only recorded, nothing is bound.
//! - A forced re-registration without a target archives whatever it
//!   displaced: the global binding, or else the previous entry.

use super::error::ActionError;
use super::executable::Executable;
use super::identity::{ActionIdentity, ActionKey};
use super::member::{ActionTarget, MemberTable};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Namespace the global member table reports.
pub const GLOBAL_NAMESPACE: &str = "global";

/// Where a registration's executable is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Namespace {
    /// A member on the named target.
    Target(String),
    /// The registry's process-wide member table.
    Global,
    /// Nowhere; the entry is for lookup only.
    Registry,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Target(name) => f.write_str(name),
            Namespace::Global => f.write_str(GLOBAL_NAMESPACE),
            Namespace::Registry => f.write_str("registry"),
        }
    }
}

/// An executable that was replaced, and when.
#[derive(Debug, Clone)]
pub struct Superseded {
    pub executable: Executable,
    pub superseded_at: DateTime<Utc>,
}

/// One registry entry.
#[derive(Debug, Clone)]
pub struct ActionRegistration {
    pub identity: ActionIdentity,
    pub name: String,
    pub executable: Executable,
    pub namespace: Namespace,
    /// Oldest first.
    pub history: Vec<Superseded>,
}

/// What a call to [`ActionRegistry::register`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    Replaced,
    /// The key was already registered and `force` was not set.
    Unchanged,
}

pub struct ActionRegistry {
    entries: DashMap<ActionKey, ActionRegistration>,
    /// One registration at a time per key, without holding an `entries` shard.
    registering: DashMap<ActionKey, Arc<Mutex<()>>>,
    globals: MemberTable,
    allow_global_rebinding: bool,
    history_limit: Option<usize>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRegistry {
    /// Creates a registry that refuses global rebinding and keeps full history.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            registering: DashMap::new(),
            globals: MemberTable::new(GLOBAL_NAMESPACE),
            allow_global_rebinding: false,
            history_limit: None,
        }
    }

    /// Opts in to binding target-less named actions into the global namespace.
    pub fn allow_global_rebinding(mut self, allow: bool) -> Self {
        self.allow_global_rebinding = allow;
        self
    }

    /// Caps the history kept per action; the oldest entries are dropped.
    pub fn history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    /// Registers `executable` under `identity`.
    ///
    /// Registrations of the same identity are serialized; the first one to
    /// reach an unseen key creates it. `target.bind` runs without any
    /// registry map locked, so a target may read the registry from inside
    /// it, but must not register the same identity again.
    ///
    /// # Errors
    /// [`ActionError::GlobalRebindingDisabled`] when the call would bind into
    /// the global namespace of a registry that does not allow it.
    pub fn register(
        &self,
        identity: impl Into<ActionIdentity>,
        executable: Executable,
        target: Option<&dyn ActionTarget>,
        force: bool,
    ) -> Result<Registration, ActionError> {
        let identity = identity.into();
        let key = identity.key();
        let name = identity.resolved_name();

        let gate = Arc::clone(self.registering.entry(key.clone()).or_default().value());
        let _serialized = gate.lock();

        let previous_entry = self.entries.get(&key).map(|r| r.executable.clone());
        if previous_entry.is_some() && !force {
            debug!(action = %name, key = key.short(), "Action already registered");
            return Ok(Registration::Unchanged);
        }
        if target.is_none() && !identity.is_step() && !self.allow_global_rebinding {
            warn!(action = %name, "Refusing global rebinding");
            return Err(ActionError::GlobalRebindingDisabled(name));
        }

        let (namespace, displaced) = match target {
            Some(target) => {
                let displaced = target.bind(&name, executable.clone());
                (Namespace::Target(target.namespace().to_string()), displaced)
            }
            None if identity.is_step() => (Namespace::Registry, previous_entry),
            None => {
                let displaced = self.globals.bind(&name, executable.clone());
                (Namespace::Global, displaced.or(previous_entry))
            }
        };
        let archived = displaced.map(|executable| Superseded {
            executable,
            superseded_at: Utc::now(),
        });

        let outcome = match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let registration = occupied.get_mut();
                registration.executable = executable;
                registration.namespace = namespace;
                self.archive(&mut registration.history, archived);
                info!(
                    action = %name,
                    key = key.short(),
                    namespace = %registration.namespace,
                    history = registration.history.len(),
                    "Action re-registered"
                );
                Registration::Replaced
            }
            Entry::Vacant(vacant) => {
                let mut history = Vec::new();
                self.archive(&mut history, archived);
                info!(
                    action = %name,
                    key = key.short(),
                    namespace = %namespace,
                    "Action registered"
                );
                vacant.insert(ActionRegistration {
                    identity,
                    name,
                    executable,
                    namespace,
                    history,
                });
                Registration::Created
            }
        };
        Ok(outcome)
    }

    fn archive(&self, history: &mut Vec<Superseded>, archived: Option<Superseded>) {
        if let Some(archived) = archived {
            history.push(archived);
        }
        if let Some(limit) = self.history_limit {
            let excess = history.len().saturating_sub(limit);
            history.drain(..excess);
        }
    }

    /// Resolved name and current executable for `identity`.
    pub fn get(&self, identity: impl Into<ActionIdentity>) -> Option<(String, Executable)> {
        let key = identity.into().key();
        self.entries
            .get(&key)
            .map(|r| (r.name.clone(), r.executable.clone()))
    }

    /// Executables `identity` superseded, oldest first.
    pub fn history(&self, identity: impl Into<ActionIdentity>) -> Vec<Superseded> {
        let key = identity.into().key();
        self.entries
            .get(&key)
            .map(|r| r.history.clone())
            .unwrap_or_default()
    }

    pub fn registration(&self, identity: impl Into<ActionIdentity>) -> Option<ActionRegistration> {
        let key = identity.into().key();
        self.entries.get(&key).map(|r| r.value().clone())
    }

    /// Executable currently bound under `name` in the global namespace.
    pub fn resolve(&self, name: &str) -> Option<Executable> {
        self.globals.member(name)
    }

    pub fn globals(&self) -> &MemberTable {
        &self.globals
    }

    pub fn keys(&self) -> Vec<ActionKey> {
        let mut keys: Vec<ActionKey> = self.entries.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("entries", &self.entries.len())
            .field("globals", &self.globals.len())
            .field("allow_global_rebinding", &self.allow_global_rebinding)
            .field("history_limit", &self.history_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exec(name: &str, value: i64) -> Executable {
        Executable::infallible(name, move |_| json!(value))
    }

    #[test]
    fn test_step_without_target_binds_nothing() {
        let registry = ActionRegistry::new();
        let step = ActionIdentity::step("ordering", 3, 1);

        let outcome = registry
            .register(step.clone(), exec("place_order", 1), None, false)
            .unwrap();
        assert_eq!(outcome, Registration::Created);

        let registration = registry.registration(step).unwrap();
        assert_eq!(registration.name, "ordering_3_1");
        assert_eq!(registration.namespace, Namespace::Registry);
        assert!(registry.globals().is_empty());
        assert_eq!(registry.keys(), vec![ActionIdentity::step("ordering", 3, 1).key()]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_forced_step_archives_previous_entry() {
        let registry = ActionRegistry::new();
        let step = ActionIdentity::step("billing", 1, 1);
        let first = exec("v1", 1);

        registry.register(step.clone(), first.clone(), None, false).unwrap();
        registry.register(step.clone(), exec("v2", 2), None, true).unwrap();

        let history = registry.history(step);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].executable, first);
    }

    #[test]
    fn test_target_member_is_archived_on_first_registration() {
        let registry = ActionRegistry::new();
        let original = exec("issue_invoice", 0);
        let billing = MemberTable::new("billing").with_member("issue_invoice", original.clone());
        let replacement = exec("issue_invoice", 1);

        registry
            .register("issue_invoice", replacement.clone(), Some(&billing), false)
            .unwrap();

        assert_eq!(billing.member("issue_invoice").unwrap(), replacement);
        let registration = registry.registration("issue_invoice").unwrap();
        assert_eq!(registration.namespace, Namespace::Target("billing".into()));
        assert_eq!(registration.history[0].executable, original);
    }

    #[test]
    fn test_history_limit_drops_oldest() {
        let registry = ActionRegistry::new().history_limit(Some(2));
        let table = MemberTable::new("catalogue");
        let versions: Vec<Executable> = (0..4).map(|v| exec("update_price", v)).collect();

        for (i, version) in versions.iter().enumerate() {
            registry
                .register("update_price", version.clone(), Some(&table), i > 0)
                .unwrap();
        }

        let history = registry.history("update_price");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].executable, versions[1]);
        assert_eq!(history[1].executable, versions[2]);
    }

    #[test]
    fn test_unknown_identity_has_empty_history() {
        let registry = ActionRegistry::new();
        assert!(registry.history("nothing").is_empty());
        assert!(registry.get("nothing").is_none());
    }
}
