//! Registry inspection: installed agent version, service startup type, and
//! the agent settings read once at startup.

use anyhow::Result;

use crate::config::VersionKeyFallback;
use crate::error::StartupError;
use crate::status::{AgentVersion, StartupType};

/// Port the agent's httpd listens on when the registry value is unusable.
pub const DEFAULT_HTTPD_PORT: u16 = 62354;

/// Read-only view of `HKEY_LOCAL_MACHINE`.  Keys are closed when dropped.
pub trait RegistryHive {
    type Key;

    fn open_key(&self, path: &str) -> Result<Self::Key>;
    fn read_string(&self, key: &Self::Key, name: &str) -> Result<String>;
    fn read_dword(&self, key: &Self::Key, name: &str) -> Result<u32>;
}

pub fn settings_key(service: &str) -> String {
    format!("SOFTWARE\\{service}")
}

pub fn wow64_settings_key(service: &str) -> String {
    format!("SOFTWARE\\WOW6432Node\\{service}")
}

pub fn installer_key(service: &str) -> String {
    format!("{}\\Installer", settings_key(service))
}

pub fn wow64_installer_key(service: &str) -> String {
    format!("{}\\Installer", wow64_settings_key(service))
}

pub fn service_key(service: &str) -> String {
    format!("SYSTEM\\CurrentControlSet\\Services\\{service}")
}

/// Map the `Start` value of a service key.  `delayed` is whether a
/// `DelayedAutostart` value exists next to it.
pub fn startup_type_from_code(code: u32, delayed: bool) -> StartupType {
    match code {
        0 => StartupType::BootStart,
        1 => StartupType::SystemStart,
        2 if delayed => StartupType::DelayedAutoStart,
        2 => StartupType::AutoStart,
        3 => StartupType::ManualStart,
        4 => StartupType::Disabled,
        _ => StartupType::Unknown,
    }
}

/// Reads the install metadata shown in the details view.
pub struct RegistryInspector<R> {
    hive: R,
    service: String,
    fallback: VersionKeyFallback,
}

impl<R: RegistryHive> RegistryInspector<R> {
    pub fn new(hive: R, service: &str, fallback: VersionKeyFallback) -> Self {
        Self {
            hive,
            service: service.to_string(),
            fallback,
        }
    }

    pub fn hive(&self) -> &R {
        &self.hive
    }

    pub fn inspect(&self) -> (AgentVersion, StartupType) {
        (self.agent_version(), self.startup_type())
    }

    pub fn agent_version(&self) -> AgentVersion {
        let primary = installer_key(&self.service);
        let second = match self.fallback {
            VersionKeyFallback::RetryPrimary => primary.clone(),
            VersionKeyFallback::Wow64Node => wow64_installer_key(&self.service),
        };

        let key = match self
            .hive
            .open_key(&primary)
            .or_else(|_| self.hive.open_key(&second))
        {
            Ok(k) => k,
            Err(e) => {
                tracing::debug!("opening installer key: {e:#}");
                return AgentVersion::AgentNotFound;
            }
        };

        match self.hive.read_string(&key, "Version") {
            Ok(v) => AgentVersion::Installed(v),
            Err(e) => {
                tracing::debug!("reading agent version: {e:#}");
                AgentVersion::VersionNotFound
            }
        }
    }

    pub fn startup_type(&self) -> StartupType {
        let key = match self.hive.open_key(&service_key(&self.service)) {
            Ok(k) => k,
            Err(e) => {
                tracing::debug!("opening service key: {e:#}");
                return StartupType::RegistryUnavailable;
            }
        };

        let code = match self.hive.read_dword(&key, "Start") {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("reading service start type: {e:#}");
                return StartupType::Unknown;
            }
        };

        // Only the presence of the value is checked, not its content.
        let delayed = code == 2
            && (self.hive.read_dword(&key, "DelayedAutostart").is_ok()
                || self.hive.read_string(&key, "DelayedAutostart").is_ok());
        startup_type_from_code(code, delayed)
    }
}

/// Settings the monitor needs before it can start polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    pub httpd_port: u16,
}

impl AgentSettings {
    /// Read `httpd-port` from the agent's settings key, trying the native
    /// path first and the WOW6432Node path second.
    pub fn load<R: RegistryHive>(hive: &R, service: &str) -> Result<Self, StartupError> {
        let key = hive
            .open_key(&settings_key(service))
            .or_else(|_| hive.open_key(&wow64_settings_key(service)))
            .map_err(|e| {
                tracing::error!("opening agent settings key: {e:#}");
                StartupError::AgentSettingsMissing
            })?;

        let httpd_port = match hive.read_string(&key, "httpd-port") {
            Ok(text) => parse_port(&text),
            Err(_) => match hive.read_dword(&key, "httpd-port") {
                Ok(n) => u16::try_from(n).ok().filter(|p| *p != 0),
                Err(e) => {
                    tracing::error!("reading httpd-port: {e:#}");
                    return Err(StartupError::HttpdPortMissing);
                }
            },
        };

        let httpd_port = httpd_port.unwrap_or_else(|| {
            tracing::warn!("httpd-port is not a valid port, using {DEFAULT_HTTPD_PORT}");
            DEFAULT_HTTPD_PORT
        });
        Ok(Self { httpd_port })
    }
}

fn parse_port(text: &str) -> Option<u16> {
    text.trim().parse::<u16>().ok().filter(|p| *p != 0)
}
