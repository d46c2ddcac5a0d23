//! Service Control Manager seam and the per-tick state query.

use anyhow::Result;

use crate::status::ServiceState;

/// Query-only access to the Service Control Manager.
///
/// `Manager` and `Service` are owned handles that close themselves on drop.
pub trait ServiceControl {
    type Manager;
    type Service;

    fn connect(&self) -> Result<Self::Manager>;
    fn open_service(&self, manager: &Self::Manager, name: &str) -> Result<Self::Service>;
    fn query_state(&self, service: &Self::Service) -> Result<ServiceState>;
}

/// Current state of `name`, or [`ServiceState::QueryFailed`] if any step
/// fails.  Both handles are dropped before returning.
pub fn read_service_state<C: ServiceControl>(scm: &C, name: &str) -> ServiceState {
    let query = || -> Result<ServiceState> {
        let manager = scm.connect()?;
        let service = scm.open_service(&manager, name)?;
        scm.query_state(&service)
    };

    match query() {
        Ok(state) => state,
        Err(e) => {
            tracing::debug!("querying service {name}: {e:#}");
            ServiceState::QueryFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeScm, ScmFailure};

    #[test]
    fn reports_queried_state() {
        for raw in 1..=7 {
            let scm = FakeScm::with_state(raw);
            let state = read_service_state(&scm, "GLPI-Agent");
            assert_eq!(state, ServiceState::from_raw(raw), "raw={raw}");
            assert_eq!(scm.live.get(), 0);
        }
    }

    #[test]
    fn any_failed_step_is_query_failed_without_leaks() {
        for stage in [ScmFailure::Connect, ScmFailure::Open, ScmFailure::Query] {
            let scm = FakeScm::running();
            scm.fail_at.set(Some(stage));
            assert_eq!(read_service_state(&scm, "GLPI-Agent"), ServiceState::QueryFailed);
            assert_eq!(scm.live.get(), 0, "stage={stage:?}");
        }
    }

    #[test]
    fn recovers_once_service_is_queryable() {
        let scm = FakeScm::running();
        scm.fail_at.set(Some(ScmFailure::Open));
        assert_eq!(read_service_state(&scm, "GLPI-Agent"), ServiceState::QueryFailed);
        scm.fail_at.set(None);
        assert_eq!(read_service_state(&scm, "GLPI-Agent"), ServiceState::Running);
    }
}
