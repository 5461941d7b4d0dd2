//! Scenario lifecycle hooks.
//!
//! One [`Runner`] serves the whole process; each worker calls
//! `before_scenario` / `after_scenario` around every attempt. The ordering
//! inside `after_scenario` is load-bearing: diagnostics and the retry
//! decision both need scenario identity and the driver, so the context is
//! cleared only after both have run, and the driver goes down last.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{error, info, warn};

use finweb_core::{AttemptOutcome, Result, RunParams, ScenarioDescriptor};
use finweb_driver::DriverHandle;
use finweb_interception::Interceptor;
use finweb_reporting::{capture_failure_diagnostics, AttachmentSink};
use finweb_session::{AttemptPhase, ContextRegistry, RetryCoordinator, WorkerId};

/// Process-wide runner state shared by all workers.
pub struct Runner {
    params: RunParams,
    registry: ContextRegistry,
    retries: RetryCoordinator,
    interceptor: Interceptor,
    sink: Arc<dyn AttachmentSink>,
    phases: Mutex<HashMap<WorkerId, AttemptPhase>>,
    started: Mutex<Option<Instant>>,
}

impl Runner {
    pub fn new(params: RunParams, sink: Arc<dyn AttachmentSink>) -> Self {
        Self {
            registry: ContextRegistry::new(params.edition),
            retries: RetryCoordinator::new(params.max_attempts),
            interceptor: Interceptor::new(&params, Arc::clone(&sink)),
            params,
            sink,
            phases: Mutex::new(HashMap::new()),
            started: Mutex::new(None),
        }
    }

    /// The shared interception layer step definitions go through.
    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    pub fn params(&self) -> &RunParams {
        &self.params
    }

    /// Current phase of a worker's attempt.
    pub fn phase(&self, worker: WorkerId) -> AttemptPhase {
        self.phases
            .lock()
            .expect("phase map poisoned")
            .get(&worker)
            .copied()
            .unwrap_or(AttemptPhase::Pending)
    }

    fn set_phase(&self, worker: WorkerId, phase: AttemptPhase) {
        self.phases
            .lock()
            .expect("phase map poisoned")
            .insert(worker, phase);
    }

    /// Run-level start hook.
    pub fn on_run_started(&self) {
        *self.started.lock().expect("run clock poisoned") = Some(Instant::now());
        info!(
            mode = ?self.params.mode,
            browser = ?self.params.browser,
            edition = %self.params.edition,
            max_attempts = self.params.max_attempts,
            "test run started"
        );
    }

    /// Run-level finish hook.
    pub fn on_run_finished(&self) {
        let elapsed = self
            .started
            .lock()
            .expect("run clock poisoned")
            .map(|at| at.elapsed());
        let leftover = self.registry.active_workers();
        if leftover > 0 {
            warn!(leftover, "run finished with live session contexts");
        }
        info!(elapsed = ?elapsed, "test run finished");
    }

    /// Prepare a worker's session for one scenario attempt.
    ///
    /// The scenario descriptor lands in the context before anything that
    /// can fail, so even a botched driver start reports against the right
    /// scenario.
    pub async fn before_scenario(
        &self,
        worker: WorkerId,
        scenario: ScenarioDescriptor,
    ) -> Result<()> {
        self.set_phase(worker, AttemptPhase::Running);

        let context = self.registry.context_for(worker);
        let mut context = context.lock().await;
        context.put_scenario(scenario.clone());
        context.set_edition(self.params.edition);

        match DriverHandle::connect(&self.params, &scenario).await {
            Ok(driver) => {
                context.set_driver(driver);
                info!(worker = %worker, scenario = %scenario, "scenario session ready");
                Ok(())
            }
            Err(err) => {
                error!(worker = %worker, scenario = %scenario, error = %err, "driver start failed");
                self.set_phase(worker, AttemptPhase::Finished(AttemptOutcome::Failure));
                Err(err)
            }
        }
    }

    /// Tear down a worker's session after one attempt.
    ///
    /// Returns whether the scenario should be re-run. Never errors — this
    /// runs on every outcome including panics upstream, and a teardown
    /// problem must not turn a finished scenario into a hung worker.
    pub async fn after_scenario(&self, worker: WorkerId, outcome: AttemptOutcome) -> bool {
        let context = self.registry.context_for(worker);
        let mut context = context.lock().await;

        let scenario = match context.scenario() {
            Ok(scenario) => scenario.clone(),
            Err(err) => {
                warn!(worker = %worker, error = %err, "after-hook without a scenario");
                drop(context);
                self.registry.remove(worker);
                self.set_phase(worker, AttemptPhase::Finished(outcome));
                return false;
            }
        };

        if outcome != AttemptOutcome::Success && context.has_driver() {
            if let Ok(driver) = context.driver() {
                capture_failure_diagnostics(self.sink.as_ref(), &scenario, driver, self.params.mode)
                    .await;
            }
        }

        // Retry bookkeeping reads stable identity before the context is
        // cleared.
        let rerun = self.retries.should_retry(&scenario, outcome);

        context.clear_all(self.params.edition).await;
        drop(context);
        self.registry.remove(worker);
        self.set_phase(worker, AttemptPhase::Finished(outcome));

        rerun
    }
}

#[cfg(test)]
mod tests {
    use finweb_reporting::MemorySink;

    use super::*;

    fn scenario(name: &str, line: u32) -> ScenarioDescriptor {
        ScenarioDescriptor {
            name: name.to_string(),
            line,
            tags: vec!["@API".to_string()],
        }
    }

    fn runner(max_attempts: u32) -> Runner {
        let params = RunParams {
            max_attempts,
            ..RunParams::default()
        };
        Runner::new(params, Arc::new(MemorySink::new()))
    }

    async fn seed_scenario(runner: &Runner, worker: WorkerId, descriptor: ScenarioDescriptor) {
        let context = runner.registry().context_for(worker);
        context.lock().await.put_scenario(descriptor);
    }

    #[tokio::test]
    async fn test_failed_attempts_rerun_until_budget_spent() {
        let runner = runner(2);
        let worker = WorkerId(1);

        seed_scenario(&runner, worker, scenario("Quote loads", 7)).await;
        assert!(runner.after_scenario(worker, AttemptOutcome::Failure).await);
        assert_eq!(runner.registry().active_workers(), 0);

        // rerun arrives as a fresh descriptor instance with the same identity
        seed_scenario(&runner, worker, scenario("Quote loads", 7)).await;
        assert!(!runner.after_scenario(worker, AttemptOutcome::Failure).await);
    }

    #[tokio::test]
    async fn test_success_never_reruns() {
        let runner = runner(3);
        let worker = WorkerId(2);

        seed_scenario(&runner, worker, scenario("Quote loads", 7)).await;
        assert!(!runner.after_scenario(worker, AttemptOutcome::Success).await);
        assert_eq!(runner.phase(worker), AttemptPhase::Finished(AttemptOutcome::Success));
    }

    #[tokio::test]
    async fn test_after_hook_without_scenario_is_safe() {
        let runner = runner(2);
        let worker = WorkerId(3);

        assert!(!runner.after_scenario(worker, AttemptOutcome::Failure).await);
        assert_eq!(runner.registry().active_workers(), 0);
        assert_eq!(runner.phase(worker), AttemptPhase::Finished(AttemptOutcome::Failure));
    }

    #[tokio::test]
    async fn test_phase_starts_pending() {
        let runner = runner(1);
        assert_eq!(runner.phase(WorkerId(9)), AttemptPhase::Pending);
    }

    #[tokio::test]
    async fn test_run_level_hooks_smoke() {
        let runner = runner(1);
        runner.on_run_started();
        runner.on_run_finished();
    }
}
