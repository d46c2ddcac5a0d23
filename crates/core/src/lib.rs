//! Core of the GLPI Agent tray monitor.
//!
//! Everything here is platform-independent: the Windows registry, the Service
//! Control Manager and the tray UI are reached through the traits in
//! [`registry`], [`service`] and [`aggregator`], with the real implementations
//! living in `glpi-monitor-windows` and `glpi-monitor-tray`.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod logging;
pub mod probe;
pub mod registry;
pub mod schedule;
pub mod service;
pub mod status;

pub use error::StartupError;

#[cfg(test)]
mod fakes;

/// Name of the Windows service the monitor watches.
pub const SERVICE_NAME: &str = "GLPI-Agent";

/// Product name used in labels, tooltips and dialog titles.
pub const APP_TITLE: &str = "GLPI Agent Monitor";

/// User agent sent with every request to the agent's httpd.
pub fn user_agent() -> String {
    format!(
        "GLPI-AgentMonitor/{}.{}",
        env!("CARGO_PKG_VERSION_MAJOR"),
        env!("CARGO_PKG_VERSION_MINOR")
    )
}
