//! Retry state machine used by the request primitive.
//!
//! The machine never performs I/O. The transport feeds it one
//! [`AttemptOutcome`] per attempt and follows the [`Action`] it returns,
//! which keeps the retry/return-immediately policy testable on its own.

use nendb_core::{NenError, Result};
use std::time::Duration;

/// Retry budget and backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Linear backoff before attempt `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(attempt)
    }
}

/// Classified result of a single attempt
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// 2xx; ends the loop
    Success(T),
    /// Definitive failure (4xx/5xx, unbuildable request); never retried
    Rejected(NenError),
    /// Connection-level failure or unexpected status; retried while budget remains
    Retryable(String),
}

#[derive(Debug)]
pub enum RetryState<T> {
    Attempting { attempt: u32 },
    WaitingBackoff { attempt: u32, delay: Duration },
    Succeeded(T),
    FailedPermanently(NenError),
}

/// What the driver should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Attempt(u32),
    Wait(Duration),
    Finish,
}

#[derive(Debug)]
pub struct RetryMachine<T> {
    policy: RetryPolicy,
    state: RetryState<T>,
    last_error: Option<String>,
}

impl<T> RetryMachine<T> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: RetryState::Attempting { attempt: 0 },
            last_error: None,
        }
    }

    pub fn state(&self) -> &RetryState<T> {
        &self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn next_action(&self) -> Action {
        match &self.state {
            RetryState::Attempting { attempt } => Action::Attempt(*attempt),
            RetryState::WaitingBackoff { delay, .. } => Action::Wait(*delay),
            RetryState::Succeeded(_) | RetryState::FailedPermanently(_) => Action::Finish,
        }
    }

    /// Feed the outcome of the attempt in flight. Ignored outside `Attempting`.
    pub fn record(&mut self, outcome: AttemptOutcome<T>) {
        let attempt = match self.state {
            RetryState::Attempting { attempt } => attempt,
            _ => return,
        };

        self.state = match outcome {
            AttemptOutcome::Success(value) => RetryState::Succeeded(value),
            AttemptOutcome::Rejected(err) => RetryState::FailedPermanently(err),
            AttemptOutcome::Retryable(reason) => {
                self.last_error = Some(reason);
                let next = attempt + 1;
                if next < self.policy.max_attempts() {
                    RetryState::WaitingBackoff {
                        attempt: next,
                        delay: self.policy.backoff(next),
                    }
                } else {
                    RetryState::FailedPermanently(self.exhausted(next))
                }
            }
        };
    }

    /// Backoff elapsed; move on to the pending attempt
    pub fn resume(&mut self) {
        if let RetryState::WaitingBackoff { attempt, .. } = self.state {
            self.state = RetryState::Attempting { attempt };
        }
    }

    pub fn finish(self) -> Result<T> {
        match self.state {
            RetryState::Succeeded(value) => Ok(value),
            RetryState::FailedPermanently(err) => Err(err),
            RetryState::Attempting { attempt } | RetryState::WaitingBackoff { attempt, .. } => {
                Err(NenError::timeout("Request loop stopped before completion")
                    .with_detail("attempts", attempt))
            }
        }
    }

    fn exhausted(&self, attempts: u32) -> NenError {
        let err = NenError::timeout("Request failed after all retries").with_detail("attempts", attempts);
        match &self.last_error {
            Some(last) => err.with_detail("error", last.clone()),
            None => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nendb_core::ErrorKind;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(100))
    }

    /// Drive the machine with scripted outcomes, returning the actions taken
    fn drive(
        machine: &mut RetryMachine<&'static str>,
        mut outcomes: Vec<AttemptOutcome<&'static str>>,
    ) -> Vec<Action> {
        outcomes.reverse();
        let mut actions = Vec::new();
        loop {
            let action = machine.next_action();
            actions.push(action);
            match action {
                Action::Attempt(_) => machine.record(outcomes.pop().expect("script ran out")),
                Action::Wait(_) => machine.resume(),
                Action::Finish => return actions,
            }
        }
    }

    #[test]
    fn test_backoff_is_linear() {
        let p = policy(3);
        assert_eq!(p.max_attempts(), 4);
        assert_eq!(p.backoff(0), Duration::ZERO);
        assert_eq!(p.backoff(1), Duration::from_millis(100));
        assert_eq!(p.backoff(3), Duration::from_millis(300));
    }

    #[test]
    fn test_success_first_try() {
        let mut machine = RetryMachine::new(policy(3));
        let actions = drive(&mut machine, vec![AttemptOutcome::Success("body")]);
        assert_eq!(actions, vec![Action::Attempt(0), Action::Finish]);
        assert_eq!(machine.finish().unwrap(), "body");
    }

    #[test]
    fn test_retryable_then_success() {
        let mut machine = RetryMachine::new(policy(3));
        let actions = drive(
            &mut machine,
            vec![
                AttemptOutcome::Retryable("connection refused".into()),
                AttemptOutcome::Retryable("unexpected status code: 302".into()),
                AttemptOutcome::Success("body"),
            ],
        );
        assert_eq!(
            actions,
            vec![
                Action::Attempt(0),
                Action::Wait(Duration::from_millis(100)),
                Action::Attempt(1),
                Action::Wait(Duration::from_millis(200)),
                Action::Attempt(2),
                Action::Finish,
            ]
        );
        assert_eq!(machine.finish().unwrap(), "body");
    }

    #[test]
    fn test_rejected_is_not_retried() {
        let mut machine = RetryMachine::new(policy(3));
        let actions = drive(
            &mut machine,
            vec![AttemptOutcome::Rejected(NenError::response("not found"))],
        );
        assert_eq!(actions, vec![Action::Attempt(0), Action::Finish]);

        let err = machine.finish().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Response);
        assert_eq!(err.message(), "not found");
    }

    #[test]
    fn test_exhaustion_makes_max_retries_plus_one_attempts() {
        let mut machine = RetryMachine::new(policy(2));
        let actions = drive(
            &mut machine,
            (0..3)
                .map(|i| AttemptOutcome::Retryable(format!("failure {}", i)))
                .collect(),
        );
        let attempts = actions
            .iter()
            .filter(|a| matches!(a, Action::Attempt(_)))
            .count();
        assert_eq!(attempts, 3);
        assert_eq!(machine.last_error(), Some("failure 2"));

        let err = machine.finish().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.message(), "Request failed after all retries");
        assert_eq!(err.detail("attempts"), Some(&serde_json::json!(3)));
        assert_eq!(err.detail("error"), Some(&serde_json::json!("failure 2")));
    }

    #[test]
    fn test_zero_retries_single_attempt() {
        let mut machine = RetryMachine::new(policy(0));
        let actions = drive(&mut machine, vec![AttemptOutcome::Retryable("down".into())]);
        assert_eq!(actions, vec![Action::Attempt(0), Action::Finish]);
        assert!(machine.finish().unwrap_err().is_timeout());
    }

    #[test]
    fn test_record_ignored_outside_attempting() {
        let mut machine: RetryMachine<&str> = RetryMachine::new(policy(1));
        machine.record(AttemptOutcome::Retryable("down".into()));
        assert!(matches!(machine.state(), RetryState::WaitingBackoff { attempt: 1, .. }));

        machine.record(AttemptOutcome::Success("late"));
        assert!(matches!(machine.state(), RetryState::WaitingBackoff { .. }));
    }
}
