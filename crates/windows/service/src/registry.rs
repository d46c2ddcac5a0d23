use anyhow::{Context, Result};
use glpi_monitor_core::registry::RegistryHive;
use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_READ, KEY_WOW64_64KEY};
use winreg::RegKey;

/// Read-only `HKEY_LOCAL_MACHINE`, always through the 64-bit view so a
/// 32-bit build sees the same keys as the agent's installer wrote.
pub struct LocalMachine {
    root: RegKey,
}

impl LocalMachine {
    pub fn new() -> Self {
        Self {
            root: RegKey::predef(HKEY_LOCAL_MACHINE),
        }
    }
}

impl Default for LocalMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryHive for LocalMachine {
    type Key = RegKey;

    fn open_key(&self, path: &str) -> Result<RegKey> {
        self.root
            .open_subkey_with_flags(path, KEY_READ | KEY_WOW64_64KEY)
            .with_context(|| format!("opening HKLM\\{path}"))
    }

    fn read_string(&self, key: &RegKey, name: &str) -> Result<String> {
        key.get_value::<String, _>(name)
            .with_context(|| format!("reading string value {name}"))
    }

    fn read_dword(&self, key: &RegKey, name: &str) -> Result<u32> {
        key.get_value::<u32, _>(name)
            .with_context(|| format!("reading DWORD value {name}"))
    }
}
