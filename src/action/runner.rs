//! # Action Runner
//!
//! Separates declaring an action from triggering it. A caller stores an
//! [`ActionRequest`] (executable, arguments, who asked, who performs it,
//! gating conditions and the outcome it should reach) and later calls
//! [`ActionRunner::execute`] with the action's key, identity or executable.
//!
//! Execution:
//!
//! 1. Resolve the stored request. None found is an
//!    [`OutcomeMismatch`](ActionError::OutcomeMismatch) with
//!    [`MismatchReason::NotRegistered`], and nothing runs.
//! 2. Evaluate the conditions, now and in order. The first one that does
//!    not hold gates the request and the executable is never called.
//! 3. Call the executable with the stored parameters.
//! 4. Compare its outcome with the expected one.
//!
//! Every attempt that resolved a request is appended to that action's audit
//! trail, which outlives request replacement.

use super::error::{ActionError, MismatchReason};
use super::executable::{ActionParams, Executable};
use super::identity::{ActionIdentity, ActionKey, ProcessStep};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A gating condition, evaluated at execution time.
#[derive(Clone)]
pub struct Condition(Arc<dyn Fn() -> bool + Send + Sync>);

impl Condition {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// A condition whose value was decided up front.
    pub fn fixed(value: bool) -> Self {
        Self::new(move || value)
    }

    pub fn holds(&self) -> bool {
        (self.0)()
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Condition::fixed(value)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Stored, never executed.
    Pending,
    /// Ran and reached the expected outcome.
    Completed,
    /// Ran and returned a different outcome.
    Mismatched,
    /// A condition did not hold; the executable was not called.
    Gated,
    /// The executable returned an error.
    Failed,
}

/// A declared intent to run an action.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    identity: ActionIdentity,
    executable: Executable,
    params: ActionParams,
    requester: Option<String>,
    performer: Option<String>,
    conditions: Vec<Condition>,
    expected_outcome: Value,
    status: RequestStatus,
    outcome: Option<Value>,
}

impl ActionRequest {
    /// A request identified by the executable's own name, expecting `null`.
    pub fn new(executable: Executable) -> Self {
        Self {
            identity: ActionIdentity::from(&executable),
            executable,
            params: ActionParams::default(),
            requester: None,
            performer: None,
            conditions: Vec::new(),
            expected_outcome: Value::Null,
            status: RequestStatus::Pending,
            outcome: None,
        }
    }

    pub fn identity(mut self, identity: impl Into<ActionIdentity>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn for_step(self, step: ProcessStep) -> Self {
        self.identity(step)
    }

    pub fn params(mut self, params: ActionParams) -> Self {
        self.params = params;
        self
    }

    pub fn requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = Some(requester.into());
        self
    }

    pub fn performer(mut self, performer: impl Into<String>) -> Self {
        self.performer = Some(performer.into());
        self
    }

    pub fn condition(mut self, condition: impl Into<Condition>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn conditions<I, C>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        self.conditions.extend(conditions.into_iter().map(Into::into));
        self
    }

    pub fn expect_outcome(mut self, outcome: impl Into<Value>) -> Self {
        self.expected_outcome = outcome.into();
        self
    }

    pub fn action_identity(&self) -> &ActionIdentity {
        &self.identity
    }

    pub fn key(&self) -> ActionKey {
        self.identity.key()
    }

    pub fn executable(&self) -> &Executable {
        &self.executable
    }

    pub fn action_params(&self) -> &ActionParams {
        &self.params
    }

    pub fn requested_by(&self) -> Option<&str> {
        self.requester.as_deref()
    }

    pub fn performed_by(&self) -> Option<&str> {
        self.performer.as_deref()
    }

    pub fn expected_outcome(&self) -> &Value {
        &self.expected_outcome
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<&Value> {
        self.outcome.as_ref()
    }

    /// Position of the first condition that does not hold.
    fn first_failing_condition(&self) -> Option<usize> {
        self.conditions.iter().position(|c| !c.holds())
    }
}

/// One execution attempt, kept for audit.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    pub action: String,
    pub status: RequestStatus,
    pub outcome: Option<Value>,
    pub requester: Option<String>,
    pub performer: Option<String>,
    pub executed_at: DateTime<Utc>,
}

/// How a caller points the runner at an action.
#[derive(Debug, Clone)]
pub enum ActionRef {
    Key(ActionKey),
    Identity(ActionIdentity),
    Executable(Executable),
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionRef::Key(key) => write!(f, "{}", key.short()),
            ActionRef::Identity(identity) => write!(f, "{identity}"),
            ActionRef::Executable(executable) => f.write_str(executable.name()),
        }
    }
}

impl From<ActionKey> for ActionRef {
    fn from(key: ActionKey) -> Self {
        ActionRef::Key(key)
    }
}

impl From<&ActionKey> for ActionRef {
    fn from(key: &ActionKey) -> Self {
        ActionRef::Key(key.clone())
    }
}

impl From<ActionIdentity> for ActionRef {
    fn from(identity: ActionIdentity) -> Self {
        ActionRef::Identity(identity)
    }
}

impl From<ProcessStep> for ActionRef {
    fn from(step: ProcessStep) -> Self {
        ActionRef::Identity(step.into())
    }
}

impl From<&str> for ActionRef {
    fn from(name: &str) -> Self {
        ActionRef::Identity(name.into())
    }
}

impl From<Executable> for ActionRef {
    fn from(executable: Executable) -> Self {
        ActionRef::Executable(executable)
    }
}

impl From<&Executable> for ActionRef {
    fn from(executable: &Executable) -> Self {
        ActionRef::Executable(executable.clone())
    }
}

/// Stores action requests and executes them on demand.
#[derive(Debug, Default)]
pub struct ActionRunner {
    requests: DashMap<ActionKey, ActionRequest>,
    audit: DashMap<ActionKey, Vec<ExecutionRecord>>,
}

impl ActionRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `request`, replacing any request with the same identity.
    pub fn register_request(&self, request: ActionRequest) -> ActionKey {
        let key = request.key();
        info!(
            action = %request.identity,
            key = key.short(),
            conditions = request.conditions.len(),
            requester = request.requester.as_deref(),
            performer = request.performer.as_deref(),
            "Action request registered"
        );
        if self.requests.insert(key.clone(), request).is_some() {
            debug!(key = key.short(), "Replaced earlier request");
        }
        key
    }

    /// Executes the stored request for `action` and returns its outcome.
    ///
    /// # Errors
    /// - [`ActionError::OutcomeMismatch`] if no request is stored, a
    ///   condition does not hold, or the outcome differs from the expected one.
    /// - [`ActionError::ExecutionFailed`] if the executable returned an error.
    pub fn execute(&self, action: impl Into<ActionRef>) -> Result<Value, ActionError> {
        let action = action.into();
        let Some((key, request)) = self.resolve(&action) else {
            warn!(action = %action, "No action request to execute");
            return Err(ActionError::mismatch(
                action.to_string(),
                MismatchReason::NotRegistered,
            ));
        };
        let name = request.identity.resolved_name();

        if let Some(failed) = request.first_failing_condition() {
            warn!(action = %name, condition = failed, "Action gated");
            self.record(&key, &request, RequestStatus::Gated, None);
            return Err(ActionError::mismatch(
                name,
                MismatchReason::ConditionsUnmet { failed },
            ));
        }

        // `request` is a clone; no table guard is held while the handler runs.
        let outcome = match request.executable.call(&request.params) {
            Ok(outcome) => outcome,
            Err(source) => {
                warn!(action = %name, error = %source, "Action failed");
                self.record(&key, &request, RequestStatus::Failed, None);
                return Err(ActionError::ExecutionFailed {
                    action: name,
                    source,
                });
            }
        };

        if outcome != request.expected_outcome {
            warn!(
                action = %name,
                expected = %request.expected_outcome,
                actual = %outcome,
                "Action outcome mismatch"
            );
            self.record(&key, &request, RequestStatus::Mismatched, Some(outcome.clone()));
            return Err(ActionError::mismatch(
                name,
                MismatchReason::UnexpectedOutcome {
                    expected: request.expected_outcome.clone(),
                    actual: outcome,
                },
            ));
        }

        info!(action = %name, outcome = %outcome, "Action completed");
        self.record(&key, &request, RequestStatus::Completed, Some(outcome.clone()));
        Ok(outcome)
    }

    /// Current stored request for `action`.
    pub fn request(&self, action: impl Into<ActionRef>) -> Option<ActionRequest> {
        self.resolve(&action.into()).map(|(_, request)| request)
    }

    /// Execution attempts for `action`, oldest first.
    pub fn audit(&self, action: impl Into<ActionRef>) -> Vec<ExecutionRecord> {
        let key = match action.into() {
            ActionRef::Key(key) => Some(key),
            ActionRef::Identity(identity) => Some(identity.key()),
            executable @ ActionRef::Executable(_) => self.resolve(&executable).map(|(k, _)| k),
        };
        key.and_then(|key| self.audit.get(&key).map(|trail| trail.clone()))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    fn resolve(&self, action: &ActionRef) -> Option<(ActionKey, ActionRequest)> {
        let by_key = |key: ActionKey| {
            self.requests
                .get(&key)
                .map(|request| (key, request.value().clone()))
        };
        match action {
            ActionRef::Key(key) => by_key(key.clone()),
            ActionRef::Identity(identity) => by_key(identity.key()),
            // Re-derive from the executable's name, else find a request holding this handle.
            ActionRef::Executable(executable) => {
                by_key(ActionIdentity::from(executable).key()).or_else(|| {
                    self.requests
                        .iter()
                        .find(|r| r.value().executable.same_as(executable))
                        .map(|r| (r.key().clone(), r.value().clone()))
                })
            }
        }
    }

    fn record(
        &self,
        key: &ActionKey,
        request: &ActionRequest,
        status: RequestStatus,
        outcome: Option<Value>,
    ) {
        // A request replaced mid-execution keeps its own status.
        if let Some(mut stored) = self.requests.get_mut(key) {
            if stored.executable.same_as(&request.executable) {
                stored.status = status;
                stored.outcome = outcome.clone();
            }
        }
        self.audit.entry(key.clone()).or_default().push(ExecutionRecord {
            action: request.identity.resolved_name(),
            status,
            outcome,
            requester: request.requester.clone(),
            performer: request.performer.clone(),
            executed_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_conditions_are_evaluated_at_execution_time() {
        let runner = ActionRunner::new();
        let approved = Arc::new(AtomicBool::new(false));
        let gate = approved.clone();

        runner.register_request(
            ActionRequest::new(Executable::infallible("ship", |_| json!("shipped")))
                .condition(Condition::new(move || gate.load(Ordering::SeqCst)))
                .expect_outcome("shipped"),
        );

        let err = runner.execute("ship").unwrap_err();
        assert_eq!(
            err.mismatch_reason(),
            Some(&MismatchReason::ConditionsUnmet { failed: 0 })
        );
        assert_eq!(runner.request("ship").unwrap().status(), RequestStatus::Gated);

        approved.store(true, Ordering::SeqCst);
        assert_eq!(runner.execute("ship").unwrap(), json!("shipped"));
        assert_eq!(runner.request("ship").unwrap().status(), RequestStatus::Completed);
    }

    #[test]
    fn test_empty_condition_list_is_vacuously_true() {
        let runner = ActionRunner::new();
        runner.register_request(ActionRequest::new(Executable::infallible("noop", |_| Value::Null)));
        assert_eq!(runner.execute("noop").unwrap(), Value::Null);
    }

    #[test]
    fn test_missing_request_is_not_registered() {
        let runner = ActionRunner::new();
        let err = runner.execute("ghost").unwrap_err();
        assert_eq!(err.mismatch_reason(), Some(&MismatchReason::NotRegistered));
        assert!(runner.audit("ghost").is_empty());
    }

    #[test]
    fn test_failing_executable_is_execution_failed() {
        let runner = ActionRunner::new();
        runner.register_request(ActionRequest::new(Executable::new("post", |_| {
            Err("ledger offline".into())
        })));

        let err = runner.execute("post").unwrap_err();
        assert!(matches!(err, ActionError::ExecutionFailed { ref action, .. } if action == "post"));
        assert_eq!(runner.audit("post")[0].status, RequestStatus::Failed);
    }

    #[test]
    fn test_resolve_by_executable_under_explicit_identity() {
        let runner = ActionRunner::new();
        let exec = Executable::infallible("anonymous", |params| {
            params.positional(0).cloned().unwrap_or(Value::Null)
        });
        let key = runner.register_request(
            ActionRequest::new(exec.clone())
                .for_step(ProcessStep::new("billing", 2, 1))
                .params(ActionParams::new().arg(7))
                .requester("buyer")
                .performer("seller")
                .expect_outcome(7),
        );

        assert_eq!(runner.execute(&exec).unwrap(), json!(7));
        let trail = runner.audit(&key);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, "billing_2_1");
        assert_eq!(trail[0].requester.as_deref(), Some("buyer"));
        assert_eq!(trail[0].performer.as_deref(), Some("seller"));
    }

    #[test]
    fn test_audit_survives_request_replacement() {
        let runner = ActionRunner::new();
        runner.register_request(
            ActionRequest::new(Executable::infallible("count", |_| json!(1))).expect_outcome(1),
        );
        runner.execute("count").unwrap();

        runner.register_request(
            ActionRequest::new(Executable::infallible("count", |_| json!(2))).expect_outcome(2),
        );
        assert_eq!(runner.request("count").unwrap().status(), RequestStatus::Pending);
        runner.execute("count").unwrap();

        let outcomes: Vec<_> = runner
            .audit("count")
            .into_iter()
            .filter_map(|r| r.outcome)
            .collect();
        assert_eq!(outcomes, vec![json!(1), json!(2)]);
        assert_eq!(runner.len(), 1);
    }
}
