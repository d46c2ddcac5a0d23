//! The tray icon plus its menu, as the core's [`Presenter`].

use anyhow::{Context, Result};
use glpi_monitor_core::aggregator::{Field, IconVariant, Presenter};
use glpi_monitor_core::status::Color;
use tray_icon::{TrayIcon, TrayIconBuilder};

use crate::icon;
use crate::menu::TrayMenu;

pub struct TrayView {
    tray_icon: TrayIcon,
    menu: TrayMenu,
    healthy_icon: tray_icon::Icon,
    error_icon: tray_icon::Icon,
}

impl TrayView {
    /// Must be called on the event-loop thread.  The icon starts healthy,
    /// matching the aggregator's initial state.
    pub fn new() -> Result<Self> {
        let menu = TrayMenu::new().context("building tray menu")?;
        let healthy_icon = icon::load(IconVariant::Healthy)?;
        let error_icon = icon::load(IconVariant::Error)?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(IconVariant::Healthy.tooltip())
            .with_icon(healthy_icon.clone())
            .with_menu(Box::new(menu.menu.clone()))
            .build()
            .context("building tray icon")?;

        Ok(Self {
            tray_icon,
            menu,
            healthy_icon,
            error_icon,
        })
    }

    pub fn menu(&self) -> &TrayMenu {
        &self.menu
    }

    pub fn set_details_visible(&mut self, visible: bool) {
        if let Err(e) = self.menu.set_details_visible(visible) {
            tracing::warn!("updating details rows: {e}");
        }
    }
}

impl Presenter for TrayView {
    fn is_visible(&self) -> bool {
        self.menu.details_visible()
    }

    fn set_field(&mut self, field: Field, text: &str) {
        self.menu.set_field(field, text);
    }

    fn set_color(&mut self, field: Field, color: Color) {
        self.menu.set_color(field, color);
    }

    fn swap_tray_icon(&mut self, variant: IconVariant, tooltip: &str) {
        let icon = match variant {
            IconVariant::Healthy => self.healthy_icon.clone(),
            IconVariant::Error => self.error_icon.clone(),
        };
        if let Err(e) = self.tray_icon.set_icon(Some(icon)) {
            tracing::warn!("swapping tray icon: {e}");
        }
        if let Err(e) = self.tray_icon.set_tooltip(Some(tooltip)) {
            tracing::warn!("updating tray tooltip: {e}");
        }
    }
}
