//! Per-worker session context

use finweb_core::{Edition, FinwebError, Result, ScenarioDescriptor};
use finweb_driver::DriverHandle;
use tracing::{debug, warn};

use crate::flags::FlagSet;

/// Isolated execution state of one scenario on one worker.
///
/// Created at scenario start, cleared at scenario end, never shared across
/// workers. The driver handle is exclusively owned here.
pub struct SessionContext {
    scenario: Option<ScenarioDescriptor>,
    driver: Option<DriverHandle>,
    flags: FlagSet,
    edition: Edition,
    /// Mirrored out of the driver at construction so failure reporting
    /// does not need a live session.
    remote_session_id: Option<String>,
}

impl SessionContext {
    pub fn new(default_edition: Edition) -> Self {
        Self {
            scenario: None,
            driver: None,
            flags: FlagSet::new(),
            edition: default_edition,
            remote_session_id: None,
        }
    }

    /// Store the scenario descriptor. Called first, before any other
    /// before-hook, so diagnostics can reference the scenario immediately.
    pub fn put_scenario(&mut self, scenario: ScenarioDescriptor) {
        debug!(scenario = %scenario, "scenario stored in session context");
        self.scenario = Some(scenario);
    }

    /// The active scenario, or [`FinwebError::NoActiveScenario`] when called
    /// before `put_scenario`.
    pub fn scenario(&self) -> Result<&ScenarioDescriptor> {
        self.scenario.as_ref().ok_or(FinwebError::NoActiveScenario)
    }

    pub fn set_driver(&mut self, driver: DriverHandle) {
        self.remote_session_id = driver.remote_session_id().map(str::to_string);
        self.driver = Some(driver);
    }

    pub fn driver(&mut self) -> Result<&mut DriverHandle> {
        self.driver.as_mut().ok_or_else(|| {
            FinwebError::Session("no driver handle in the session context".to_string())
        })
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    /// Split access for interception hooks: the hook drives the browser
    /// and flips flags in the same pass.
    pub fn driver_and_flags(&mut self) -> Result<(&mut DriverHandle, &mut FlagSet)> {
        match self.driver.as_mut() {
            Some(driver) => Ok((driver, &mut self.flags)),
            None => Err(FinwebError::Session(
                "no driver handle in the session context".to_string(),
            )),
        }
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn flags_mut(&mut self) -> &mut FlagSet {
        &mut self.flags
    }

    pub fn edition(&self) -> Edition {
        self.edition
    }

    /// Editions can change mid-scenario when a step navigates to an
    /// edition-specific URL.
    pub fn set_edition(&mut self, edition: Edition) {
        debug!(%edition, "session edition changed");
        self.edition = edition;
    }

    /// Remote session id captured at driver construction, if any.
    pub fn remote_session_id(&self) -> Option<&str> {
        self.remote_session_id.as_deref()
    }

    /// Tear down everything this context holds.
    ///
    /// Runs at the end of every scenario regardless of outcome and never
    /// errors: each piece is cleared in isolation and a failure in one is
    /// logged without blocking the others. The driver goes down last so
    /// retry bookkeeping can still read scenario identity before it.
    pub async fn clear_all(&mut self, default_edition: Edition) {
        self.flags.clear();
        self.scenario = None;
        self.edition = default_edition;
        self.remote_session_id = None;

        if let Some(mut driver) = self.driver.take() {
            // dispose never raises; anything it logs is advisory
            driver.dispose().await;
        } else {
            warn!("session context cleared without a driver handle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{FlagKey, PromoCampaign};

    fn scenario() -> ScenarioDescriptor {
        ScenarioDescriptor::new("Open equities page", 42, vec![])
    }

    #[test]
    fn test_scenario_before_put_fails() {
        let ctx = SessionContext::new(Edition::Www);
        assert!(matches!(
            ctx.scenario(),
            Err(FinwebError::NoActiveScenario)
        ));
    }

    #[test]
    fn test_scenario_available_after_put() {
        let mut ctx = SessionContext::new(Edition::Www);
        ctx.put_scenario(scenario());
        assert_eq!(ctx.scenario().unwrap().line, 42);
    }

    #[tokio::test]
    async fn test_clear_all_resets_state_and_never_errors() {
        let mut ctx = SessionContext::new(Edition::Www);
        ctx.put_scenario(scenario());
        ctx.set_edition(Edition::De);
        ctx.flags_mut().set(FlagKey::PromoPopup(PromoCampaign::ProTips));

        // no driver present; clearing must still succeed
        ctx.clear_all(Edition::Www).await;

        assert!(matches!(ctx.scenario(), Err(FinwebError::NoActiveScenario)));
        assert_eq!(ctx.edition(), Edition::Www);
        assert!(!ctx.flags().is_set(FlagKey::PromoPopup(PromoCampaign::ProTips)));
        assert!(!ctx.has_driver());
    }

    #[tokio::test]
    async fn test_clear_all_is_idempotent() {
        let mut ctx = SessionContext::new(Edition::Www);
        ctx.clear_all(Edition::Www).await;
        ctx.clear_all(Edition::Www).await;
    }
}
