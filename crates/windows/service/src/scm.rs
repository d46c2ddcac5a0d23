use anyhow::{Context, Result};
use glpi_monitor_core::service::ServiceControl;
use glpi_monitor_core::status::ServiceState;
use windows_service::{
    service::{Service, ServiceAccess, ServiceState as ScmState},
    service_manager::{ServiceManager, ServiceManagerAccess},
};

/// Query-only client of the local Service Control Manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct Scm;

impl ServiceControl for Scm {
    type Manager = ServiceManager;
    type Service = Service;

    fn connect(&self) -> Result<ServiceManager> {
        ServiceManager::local_computer(None::<&str>, ServiceManagerAccess::CONNECT)
            .context("connecting to SCM")
    }

    fn open_service(&self, manager: &ServiceManager, name: &str) -> Result<Service> {
        manager
            .open_service(name, ServiceAccess::QUERY_STATUS)
            .with_context(|| format!("opening service {name}"))
    }

    fn query_state(&self, service: &Service) -> Result<ServiceState> {
        let status = service.query_status().context("querying service status")?;
        Ok(match status.current_state {
            ScmState::Stopped => ServiceState::Stopped,
            ScmState::StartPending => ServiceState::StartPending,
            ScmState::StopPending => ServiceState::StopPending,
            ScmState::Running => ServiceState::Running,
            ScmState::ContinuePending => ServiceState::ContinuePending,
            ScmState::PausePending => ServiceState::PausePending,
            ScmState::Paused => ServiceState::Paused,
        })
    }
}
