//! Per-tick aggregation of the SCM, registry and httpd sources into a
//! [`StatusSnapshot`], and the display effects derived from it.
//!
//! A tick is split in two:
//!
//! 1. [`Aggregator::collect`] calls the sources.  Every failure is folded
//!    into an enum variant, so collection always yields a snapshot.
//! 2. [`plan_tick`] is pure: given the previous tick's [`MonitorState`] and
//!    the new snapshot it returns the next state and the list of [`Effect`]s
//!    for the presentation layer.  The tray icon is only swapped when the
//!    health flag changes.

use crate::config::VersionKeyFallback;
use crate::probe::{self, AgentHttp, InventoryOutcome};
use crate::registry::{RegistryHive, RegistryInspector};
use crate::service::{read_service_state, ServiceControl};
use crate::status::{AgentDetails, Color, StatusSnapshot};
use crate::APP_TITLE;

/// Display fields of the details view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    AgentVersion,
    StartupType,
    ServiceStatus,
    AgentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconVariant {
    Healthy,
    Error,
}

impl IconVariant {
    pub fn for_health(healthy: bool) -> Self {
        if healthy {
            Self::Healthy
        } else {
            Self::Error
        }
    }

    pub fn tooltip(self) -> String {
        match self {
            Self::Healthy => APP_TITLE.to_string(),
            Self::Error => format!("{APP_TITLE}: the agent is not running"),
        }
    }
}

/// A single instruction for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SetField(Field, String),
    SetColor(Field, Color),
    SwapTrayIcon { variant: IconVariant, tooltip: String },
}

/// The UI surface the core drives.  It never sees window or control handles.
pub trait Presenter {
    /// Whether the details view is currently shown.
    fn is_visible(&self) -> bool;
    fn set_field(&mut self, field: Field, text: &str);
    fn set_color(&mut self, field: Field, color: Color);
    fn swap_tray_icon(&mut self, variant: IconVariant, tooltip: &str);
}

impl Effect {
    pub fn apply<P: Presenter + ?Sized>(&self, presenter: &mut P) {
        match self {
            Effect::SetField(field, text) => presenter.set_field(*field, text),
            Effect::SetColor(field, color) => presenter.set_color(*field, *color),
            Effect::SwapTrayIcon { variant, tooltip } => presenter.swap_tray_icon(*variant, tooltip),
        }
    }
}

/// State carried from one tick to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorState {
    /// Health shown by the tray icon.  The icon starts out healthy.
    pub icon_healthy: bool,
    /// Whether the service was running at the last tick.
    pub running: bool,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self {
            icon_healthy: true,
            running: false,
        }
    }
}

/// Decide what the presentation layer must change after a tick.
pub fn plan_tick(previous: MonitorState, snapshot: &StatusSnapshot) -> (MonitorState, Vec<Effect>) {
    let mut effects = Vec::new();

    if let Some(details) = &snapshot.details {
        let state = snapshot.service_state;
        effects.push(Effect::SetField(Field::AgentVersion, details.agent_version.to_string()));
        effects.push(Effect::SetField(Field::StartupType, details.startup_type.to_string()));
        effects.push(Effect::SetField(Field::ServiceStatus, state.to_string()));
        effects.push(Effect::SetColor(Field::ServiceStatus, state.color()));
        effects.push(Effect::SetField(Field::AgentStatus, details.agent_status.to_string()));
    }

    if snapshot.icon_healthy != previous.icon_healthy {
        let variant = IconVariant::for_health(snapshot.icon_healthy);
        effects.push(Effect::SwapTrayIcon {
            variant,
            tooltip: variant.tooltip(),
        });
    }

    let next = MonitorState {
        icon_healthy: snapshot.icon_healthy,
        running: snapshot.running,
    };
    (next, effects)
}

/// Owns the three data sources and the cross-tick state.
pub struct Aggregator<C, R, H> {
    scm: C,
    registry: RegistryInspector<R>,
    http: H,
    service_name: String,
    state: MonitorState,
}

impl<C, R, H> Aggregator<C, R, H>
where
    C: ServiceControl,
    R: RegistryHive,
    H: AgentHttp,
{
    pub fn new(scm: C, registry: R, http: H, service_name: &str, fallback: VersionKeyFallback) -> Self {
        Self {
            scm,
            registry: RegistryInspector::new(registry, service_name, fallback),
            http,
            service_name: service_name.to_string(),
            state: MonitorState::default(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn scm(&self) -> &C {
        &self.scm
    }

    pub fn registry(&self) -> &RegistryInspector<R> {
        &self.registry
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    /// Query the sources.  The registry and the httpd are only consulted when
    /// `details_visible`; the httpd additionally only when the service runs.
    pub fn collect(&self, details_visible: bool) -> StatusSnapshot {
        let service_state = read_service_state(&self.scm, &self.service_name);

        let details = details_visible.then(|| {
            let (agent_version, startup_type) = self.registry.inspect();
            let agent_status = probe::probe_status(&self.http, service_state.is_running());
            AgentDetails {
                agent_version,
                startup_type,
                agent_status,
            }
        });

        StatusSnapshot::new(service_state, details)
    }

    /// Run one tick against `presenter` and return the snapshot it produced.
    pub fn tick<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> StatusSnapshot {
        let snapshot = self.collect(presenter.is_visible());
        let (next, effects) = plan_tick(self.state, &snapshot);

        if next.icon_healthy != self.state.icon_healthy {
            tracing::info!(
                "service {} is {}",
                self.service_name,
                if next.running { "running" } else { "not running" }
            );
        }
        self.state = next;

        for effect in &effects {
            effect.apply(presenter);
        }
        snapshot
    }

    /// Force-inventory request, gated on the state of the last tick.
    pub fn force_inventory(&self) -> InventoryOutcome {
        probe::force_inventory(&self.http, self.state.running, self.state.icon_healthy)
    }
}
