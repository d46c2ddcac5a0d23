//! The per-tick status model and its display labels.

use std::fmt;

/// Text color for a display field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 127, b: 0 };
    pub const AMBER: Color = Color { r: 255, g: 165, b: 0 };
}

/// Run-state of the watched service as reported by the SCM, or the fact
/// that it could not be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Stopped,
    StartPending,
    StopPending,
    Running,
    ContinuePending,
    PausePending,
    Paused,
    QueryFailed,
}

impl ServiceState {
    /// Map a raw `SERVICE_STATUS::dwCurrentState` value.  Values outside the
    /// seven documented states are treated as a failed query.
    pub fn from_raw(state: u32) -> Self {
        match state {
            1 => Self::Stopped,
            2 => Self::StartPending,
            3 => Self::StopPending,
            4 => Self::Running,
            5 => Self::ContinuePending,
            6 => Self::PausePending,
            7 => Self::Paused,
            _ => Self::QueryFailed,
        }
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    pub fn color(self) -> Color {
        match self {
            Self::Running => Color::GREEN,
            Self::Stopped | Self::QueryFailed => Color::RED,
            Self::StartPending
            | Self::StopPending
            | Self::ContinuePending
            | Self::PausePending
            | Self::Paused => Color::AMBER,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::StartPending => "Starting",
            Self::StopPending => "Stopping",
            Self::Running => "Running",
            Self::ContinuePending => "Resuming",
            Self::PausePending => "Pausing",
            Self::Paused => "Paused",
            Self::QueryFailed => "Unable to query the service",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Configured startup type of the service, from its registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupType {
    BootStart,
    SystemStart,
    AutoStart,
    DelayedAutoStart,
    ManualStart,
    Disabled,
    Unknown,
    RegistryUnavailable,
}

impl StartupType {
    pub fn label(self) -> &'static str {
        match self {
            Self::BootStart => "Boot",
            Self::SystemStart => "System",
            Self::AutoStart => "Automatic",
            Self::DelayedAutoStart => "Automatic (delayed start)",
            Self::ManualStart => "Manual",
            Self::Disabled => "Disabled",
            Self::Unknown => "Unknown startup type",
            Self::RegistryUnavailable => "Unable to read the registry",
        }
    }
}

impl fmt::Display for StartupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Installed agent version, or which part of the install key was missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentVersion {
    Installed(String),
    /// The `Installer` key could not be opened.
    AgentNotFound,
    /// The key exists but has no `Version` value.
    VersionNotFound,
}

impl fmt::Display for AgentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installed(v) => write!(f, "GLPI Agent {v}"),
            Self::AgentNotFound => f.write_str("GLPI Agent not found"),
            Self::VersionNotFound => f.write_str("Agent version not found"),
        }
    }
}

/// What the agent's httpd says about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStatus {
    /// Text after the `status: ` prefix.
    Reported(String),
    /// The service is not running, so the probe was skipped.
    NotRunning,
    /// The request failed or timed out.
    NotResponding,
    /// A reply arrived but was too short to carry the status prefix.
    MalformedResponse,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reported(text) => f.write_str(text),
            Self::NotRunning => f.write_str("not running"),
            Self::NotResponding => f.write_str("not responding"),
            Self::MalformedResponse => f.write_str("not responding (malformed response)"),
        }
    }
}

/// Fields only gathered while the details view is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDetails {
    pub agent_version: AgentVersion,
    pub startup_type: StartupType,
    pub agent_status: AgentStatus,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub service_state: ServiceState,
    pub running: bool,
    pub icon_healthy: bool,
    pub details: Option<AgentDetails>,
}

impl StatusSnapshot {
    pub fn new(service_state: ServiceState, details: Option<AgentDetails>) -> Self {
        let running = service_state.is_running();
        Self {
            service_state,
            running,
            icon_healthy: running,
            details,
        }
    }
}
