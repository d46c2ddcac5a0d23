//! Windows implementations of the monitor's system seams.
//!
//! [`Scm`] queries the Service Control Manager through `windows-service`;
//! [`LocalMachine`] reads `HKEY_LOCAL_MACHINE` through `winreg`.  Both hand
//! out owned handles that close on drop, so a tick never leaks one.

#![cfg(windows)]

mod registry;
mod scm;

pub use registry::LocalMachine;
pub use scm::Scm;
