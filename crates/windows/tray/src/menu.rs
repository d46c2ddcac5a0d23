//! Tray icon menu construction and the details rows that stand in for the
//! status dialog.

use anyhow::Result;
use glpi_monitor_core::aggregator::Field;
use glpi_monitor_core::status::Color;
use tray_icon::menu::{CheckMenuItem, Menu, MenuId, MenuItem, PredefinedMenuItem};

const LOADING: &str = "Loading\u{2026}";

const DETAIL_FIELDS: [Field; 4] = [
    Field::AgentVersion,
    Field::ServiceStatus,
    Field::StartupType,
    Field::AgentStatus,
];

struct DetailRow {
    field: Field,
    item: MenuItem,
    value: String,
    color: Option<Color>,
}

impl DetailRow {
    fn refresh(&self) {
        self.item.set_text(row_text(self.field, &self.value, self.color));
    }
}

/// Holds references to menu items that need runtime updates.
///
/// Layout, top to bottom: the "Show Agent Details" toggle, the detail rows
/// (only while the toggle is checked), "Force Inventory", "Quit".
pub struct TrayMenu {
    pub menu: Menu,
    details_item: CheckMenuItem,
    details_separator: PredefinedMenuItem,
    rows: Vec<DetailRow>,
    force_item: MenuItem,
    quit_item: MenuItem,
    details_visible: bool,
}

impl TrayMenu {
    pub fn new() -> anyhow::Result<Self> {
        let menu = Menu::new();

        let details_item = CheckMenuItem::new("Show Agent Details", true, false, None);
        let force_item = MenuItem::new("Force Inventory", true, None);
        let quit_item = MenuItem::new("Quit", true, None);

        menu.append(&details_item)?;
        menu.append(&PredefinedMenuItem::separator())?;
        menu.append(&force_item)?;
        menu.append(&PredefinedMenuItem::separator())?;
        menu.append(&quit_item)?;

        // Informational rows are disabled items, inserted on demand.
        let rows = DETAIL_FIELDS
            .iter()
            .map(|&field| DetailRow {
                field,
                item: MenuItem::new(row_text(field, LOADING, None), false, None),
                value: LOADING.to_string(),
                color: None,
            })
            .collect();

        Ok(Self {
            menu,
            details_item,
            details_separator: PredefinedMenuItem::separator(),
            rows,
            force_item,
            quit_item,
            details_visible: false,
        })
    }

    /// Returns the MenuId of each action item for event matching.
    pub fn details_id(&self) -> MenuId { self.details_item.id().clone() }
    pub fn force_id(&self) -> MenuId { self.force_item.id().clone() }
    pub fn quit_id(&self) -> MenuId { self.quit_item.id().clone() }

    pub fn details_visible(&self) -> bool {
        self.details_visible
    }

    /// The check item flips itself when clicked; this reads its new state.
    pub fn details_checked(&self) -> bool {
        self.details_item.is_checked()
    }

    pub fn set_details_visible(&mut self, visible: bool) -> Result<()> {
        self.details_item.set_checked(visible);
        if visible == self.details_visible {
            return Ok(());
        }

        if visible {
            self.menu.insert(&self.details_separator, 1)?;
            for (i, row) in self.rows.iter().enumerate() {
                self.menu.insert(&row.item, 2 + i)?;
            }
        } else {
            for row in &self.rows {
                self.menu.remove(&row.item)?;
            }
            self.menu.remove(&self.details_separator)?;
        }
        self.details_visible = visible;
        Ok(())
    }

    pub fn set_field(&mut self, field: Field, text: &str) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.field == field) {
            row.value = text.to_string();
            row.refresh();
        }
    }

    pub fn set_color(&mut self, field: Field, color: Color) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.field == field) {
            row.color = Some(color);
            row.refresh();
        }
    }
}

fn caption(field: Field) -> &'static str {
    match field {
        Field::AgentVersion => "Agent version",
        Field::StartupType => "Startup type",
        Field::ServiceStatus => "Service status",
        Field::AgentStatus => "Agent status",
    }
}

/// Menu items can't be colored, so the color becomes a leading glyph.
fn color_marker(color: Color) -> &'static str {
    match color {
        Color::GREEN => "\u{1F7E2} ",
        Color::RED => "\u{1F534} ",
        Color::AMBER => "\u{1F7E0} ",
        _ => "",
    }
}

fn row_text(field: Field, value: &str, color: Option<Color>) -> String {
    let marker = color.map(color_marker).unwrap_or_default();
    format!("{}: {marker}{value}", caption(field))
}
