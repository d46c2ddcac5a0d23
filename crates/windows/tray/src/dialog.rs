//! Modal message boxes for startup failures and force-inventory results.

use glpi_monitor_core::probe::{Dialog, DialogKind};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    MessageBoxW, MB_ICONERROR, MB_ICONINFORMATION, MB_OK, MB_SETFOREGROUND,
};

pub fn show(dialog: &Dialog) {
    show_message(dialog.kind, dialog.title, dialog.message);
}

/// Blocks until the user dismisses the box.
pub fn show_message(kind: DialogKind, title: &str, message: &str) {
    let icon = match kind {
        DialogKind::Info => MB_ICONINFORMATION,
        DialogKind::Error => MB_ICONERROR,
    };
    let title = wide(title);
    let message = wide(message);
    unsafe {
        MessageBoxW(0, message.as_ptr(), title.as_ptr(), MB_OK | MB_SETFOREGROUND | icon);
    }
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
