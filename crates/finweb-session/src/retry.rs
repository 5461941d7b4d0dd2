//! Retry coordination across parallel scenario execution
//!
//! Runner-generated scenario IDs are not stable across reruns, so attempts
//! are counted against the stable `name (line N)` key. The ledger is the
//! one structure shared by all workers and never resets during the process
//! lifetime: a scenario retried to its limit stays exhausted.

use std::collections::HashMap;
use std::sync::Mutex;

use finweb_core::{AttemptOutcome, ScenarioDescriptor};
use tracing::info;

/// Phase of one scenario execution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    Pending,
    Running,
    Finished(AttemptOutcome),
}

/// Process-wide retry ledger
pub struct RetryCoordinator {
    max_attempts: u32,
    attempts: Mutex<HashMap<String, u32>>,
}

impl RetryCoordinator {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Record a finished attempt and decide whether to re-run.
    ///
    /// Increment-then-compare happens under one lock acquisition per key:
    /// two workers finishing the same scenario cannot both observe a count
    /// just under the limit and both authorize a retry.
    pub fn should_retry(&self, scenario: &ScenarioDescriptor, outcome: AttemptOutcome) -> bool {
        if !outcome.is_retryable() {
            return false;
        }

        let key = scenario.stable_key();
        let completed = {
            let mut attempts = self.attempts.lock().expect("retry ledger poisoned");
            let counter = attempts.entry(key.clone()).or_insert(0);
            *counter += 1;
            *counter
        };

        let retry = completed < self.max_attempts;
        if retry {
            info!(
                scenario = %key,
                %outcome,
                attempt = completed,
                "retrying scenario"
            );
        } else {
            info!(
                scenario = %key,
                %outcome,
                attempt = completed,
                "retry budget exhausted, accepting outcome"
            );
        }
        retry
    }

    /// Completed attempts recorded for a scenario.
    pub fn attempt_count(&self, scenario: &ScenarioDescriptor) -> u32 {
        self.attempts
            .lock()
            .expect("retry ledger poisoned")
            .get(&scenario.stable_key())
            .copied()
            .unwrap_or(0)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn scenario() -> ScenarioDescriptor {
        ScenarioDescriptor::new("Open equities page", 42, vec![])
    }

    #[test]
    fn test_always_failing_scenario_is_attempted_exactly_max_times() {
        let coordinator = RetryCoordinator::new(2);
        let s = scenario();

        // attempt 1 fails: 1 < 2, rerun authorized
        assert!(coordinator.should_retry(&s, AttemptOutcome::Failure));
        // attempt 2 fails: 2 is not < 2, rerun denied
        assert!(!coordinator.should_retry(&s, AttemptOutcome::Failure));
        assert_eq!(coordinator.attempt_count(&s), 2);
    }

    #[test]
    fn test_success_is_never_retried_and_not_counted() {
        let coordinator = RetryCoordinator::new(3);
        let s = scenario();
        assert!(!coordinator.should_retry(&s, AttemptOutcome::Success));
        assert_eq!(coordinator.attempt_count(&s), 0);
    }

    #[test]
    fn test_skipped_counts_like_failure() {
        let coordinator = RetryCoordinator::new(2);
        let s = scenario();
        assert!(coordinator.should_retry(&s, AttemptOutcome::Skipped));
        assert_eq!(coordinator.attempt_count(&s), 1);
    }

    #[test]
    fn test_stable_key_shared_across_rerun_instances() {
        // Re-created descriptors (fresh runtime IDs) count against the
        // same ledger entry.
        let coordinator = RetryCoordinator::new(2);
        assert!(coordinator.should_retry(&scenario(), AttemptOutcome::Failure));
        assert!(!coordinator.should_retry(&scenario(), AttemptOutcome::Failure));
    }

    #[test]
    fn test_different_lines_are_different_scenarios() {
        let coordinator = RetryCoordinator::new(1);
        let row_a = ScenarioDescriptor::new("Outline", 10, vec![]);
        let row_b = ScenarioDescriptor::new("Outline", 11, vec![]);

        assert!(!coordinator.should_retry(&row_a, AttemptOutcome::Failure));
        // row_b has its own budget
        assert_eq!(coordinator.attempt_count(&row_b), 0);
    }

    #[test]
    fn test_ledger_never_resets() {
        let coordinator = RetryCoordinator::new(1);
        let s = scenario();
        assert!(!coordinator.should_retry(&s, AttemptOutcome::Failure));
        // encountered again later in the process: still exhausted
        assert!(!coordinator.should_retry(&s, AttemptOutcome::Failure));
        assert_eq!(coordinator.attempt_count(&s), 2);
    }

    #[test]
    fn test_concurrent_workers_cannot_both_win_the_last_retry() {
        // With max_attempts = 2 only one of two concurrent failures of the
        // same scenario may be authorized to retry.
        let coordinator = Arc::new(RetryCoordinator::new(2));
        let mut handles = Vec::new();

        for _ in 0..2 {
            let coordinator = coordinator.clone();
            handles.push(std::thread::spawn(move || {
                coordinator.should_retry(&scenario(), AttemptOutcome::Failure)
            }));
        }

        let authorized: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(authorized.iter().filter(|kept| **kept).count(), 1);
        assert_eq!(coordinator.attempt_count(&scenario()), 2);
    }
}
