use thiserror::Error;

/// Failures that stop the monitor before its first tick.  Each maps to its
/// own process exit code.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("GLPI Agent settings were not found in the registry. Is the agent installed?")]
    AgentSettingsMissing,

    #[error("The GLPI Agent httpd-port setting is missing from the registry.")]
    HttpdPortMissing,

    #[error("Unable to create the tray icon: {0}")]
    TrayUnavailable(String),
}

impl StartupError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AgentSettingsMissing => -10,
            Self::HttpdPortMissing => -30,
            Self::TrayUnavailable(_) => -40,
        }
    }
}
