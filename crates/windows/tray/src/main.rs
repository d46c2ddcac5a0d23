//! glpi-agent-monitor: Windows tray monitor for the GLPI Agent service.
//!
//! Polls the service state every couple of seconds, swaps the tray icon when
//! the agent stops or comes back, shows install and httpd status on demand,
//! and lets the user ask the agent for an immediate inventory.

#![cfg_attr(windows, windows_subsystem = "windows")]

// On non-Windows this binary is a stub.
#[cfg(not(windows))]
fn main() {
    eprintln!("glpi-agent-monitor is only supported on Windows.");
    std::process::exit(1);
}

#[cfg(windows)]
mod dialog;
#[cfg(windows)]
mod icon;
#[cfg(windows)]
mod menu;
#[cfg(windows)]
mod view;

#[cfg(windows)]
use std::path::PathBuf;
#[cfg(windows)]
use std::time::{Duration, Instant};

#[cfg(windows)]
use anyhow::{Context, Result};
#[cfg(windows)]
use glpi_monitor_core::{
    aggregator::Aggregator,
    config::MonitorConfig,
    logging,
    probe::{AgentConnection, DialogKind},
    registry::AgentSettings,
    schedule::PollSchedule,
    StartupError, SERVICE_NAME,
};
#[cfg(windows)]
use glpi_monitor_windows::{LocalMachine, Scm};
#[cfg(windows)]
use tray_icon::{menu::MenuEvent, MouseButton, MouseButtonState, TrayIconEvent};
#[cfg(windows)]
use winit::{
    application::ApplicationHandler,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
};

#[cfg(windows)]
type Monitor = Aggregator<Scm, LocalMachine, AgentConnection>;

/// How often menu and tray events are drained between ticks.
#[cfg(windows)]
const EVENT_POLL: Duration = Duration::from_millis(100);

#[cfg(windows)]
fn main() -> Result<()> {
    // A missing directory just means no config file; logging creates it.
    let data_dir = data_dir();
    let config = match MonitorConfig::load(&data_dir.join("monitor.toml")) {
        Ok(c) => c,
        Err(e) => {
            dialog::show_message(DialogKind::Error, "Error", &format!("{e:#}"));
            return Err(e);
        }
    };
    let _log_guard = logging::init(&config.log, Some(&data_dir));
    tracing::info!("starting, config dir {}", data_dir.display());

    let settings = AgentSettings::load(&LocalMachine::new(), SERVICE_NAME)
        .unwrap_or_else(|e| fail_startup(e));
    tracing::info!("agent httpd on port {}", settings.httpd_port);

    let http = AgentConnection::new(
        settings.httpd_port,
        &glpi_monitor_core::user_agent(),
        config.probe_timeout(),
    )?;
    let monitor = Aggregator::new(
        Scm,
        LocalMachine::new(),
        http,
        SERVICE_NAME,
        config.version_key_fallback,
    );

    let event_loop = EventLoop::new().context("creating event loop")?;

    let view = view::TrayView::new()
        .unwrap_or_else(|e| fail_startup(StartupError::TrayUnavailable(format!("{e:#}"))));

    let mut app = TrayApp {
        view,
        monitor,
        schedule: PollSchedule::new(config.poll_interval(), Instant::now()),
        should_quit: false,
    };

    event_loop
        .run_app(&mut app)
        .context("running event loop")?;

    tracing::info!("exiting");
    Ok(())
}

#[cfg(windows)]
fn fail_startup(err: StartupError) -> ! {
    tracing::error!("{err}");
    dialog::show_message(DialogKind::Error, "Error", &err.to_string());
    std::process::exit(err.exit_code());
}

#[cfg(windows)]
struct TrayApp {
    view: view::TrayView,
    monitor: Monitor,
    schedule: PollSchedule,
    should_quit: bool,
}

#[cfg(windows)]
impl ApplicationHandler for TrayApp {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        // No windows to create; the tray icon is already set up.
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        _event: winit::event::WindowEvent,
    ) {
        // No windows owned by this app.
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Left-click opens the details, like the menu toggle.
        while let Ok(tray_event) = TrayIconEvent::receiver().try_recv() {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = tray_event
            {
                self.show_details(true);
            }
        }

        while let Ok(menu_event) = MenuEvent::receiver().try_recv() {
            self.handle_menu_event(&menu_event);
        }

        if self.should_quit {
            event_loop.exit();
            return;
        }

        if self.schedule.is_due(Instant::now()) {
            self.monitor.tick(&mut self.view);
            self.schedule.mark_ran(Instant::now());
        }

        let wake = self.schedule.deadline().min(Instant::now() + EVENT_POLL);
        event_loop.set_control_flow(ControlFlow::WaitUntil(wake));
    }
}

#[cfg(windows)]
impl TrayApp {
    fn handle_menu_event(&mut self, event: &MenuEvent) {
        let menu = self.view.menu();
        if event.id == menu.quit_id() {
            self.should_quit = true;
        } else if event.id == menu.details_id() {
            let checked = menu.details_checked();
            self.show_details(checked);
        } else if event.id == menu.force_id() {
            self.force_inventory();
        }
    }

    /// Opening the details refreshes them right away instead of waiting for
    /// the next interval.
    fn show_details(&mut self, visible: bool) {
        self.view.set_details_visible(visible);
        if visible {
            self.schedule.trigger_now(Instant::now());
        }
    }

    fn force_inventory(&self) {
        let outcome = self.monitor.force_inventory();
        tracing::info!("force inventory: {outcome:?}");
        dialog::show(&outcome.dialog());
    }
}

#[cfg(windows)]
fn data_dir() -> PathBuf {
    std::env::var_os("LOCALAPPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join("GLPI-AgentMonitor")
}
