//! HTTP conversation with the agent's loopback httpd: the `/status` probe and
//! the `/now` force-inventory request.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::status::AgentStatus;
use crate::APP_TITLE;

/// Length of the `status: ` prefix the agent puts before its status text.
pub const STATUS_PREFIX_LEN: usize = 8;

/// Longest status text kept for display, in characters.
pub const STATUS_TEXT_MAX: usize = 127;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Blocking GETs against the agent.  `Err` means no reply at all.
pub trait AgentHttp {
    fn get(&self, path: &str) -> Result<HttpReply>;

    /// Like [`get`](Self::get) but returns once the status line is in; the
    /// body is never read.
    fn get_status(&self, path: &str) -> Result<u16>;
}

/// Long-lived HTTP client bound to `127.0.0.1:<port>`.  Created once at
/// startup and dropped at shutdown; each request's response is released
/// before `get` returns.
pub struct AgentConnection {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl AgentConnection {
    pub fn new(port: u16, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .no_proxy()
            .timeout(timeout)
            .build()
            .context("building agent HTTP client")?;
        Ok(Self {
            client,
            base_url: format!("http://127.0.0.1:{port}"),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl AgentHttp for AgentConnection {
    fn get(&self, path: &str) -> Result<HttpReply> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("GET {path}"))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .with_context(|| format!("reading GET {path} body"))?
            .to_vec();
        Ok(HttpReply { status, body })
    }

    fn get_status(&self, path: &str) -> Result<u16> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("GET {path}"))?;
        Ok(resp.status().as_u16())
    }
}

/// Turn a `/status` body into display text.
///
/// The first [`STATUS_PREFIX_LEN`] bytes are dropped unseen.  The rest is
/// read as ASCII-compatible text up to the first NUL, line break or invalid
/// byte, capped at [`STATUS_TEXT_MAX`] characters.
pub fn parse_status_body(body: &[u8]) -> AgentStatus {
    let Some(rest) = body.get(STATUS_PREFIX_LEN..) else {
        return AgentStatus::MalformedResponse;
    };

    let rest = match std::str::from_utf8(rest) {
        Ok(s) => s,
        // valid_up_to() always lands on a char boundary.
        Err(e) => std::str::from_utf8(&rest[..e.valid_up_to()]).unwrap_or_default(),
    };
    let line = rest
        .split(['\0', '\r', '\n'])
        .next()
        .unwrap_or_default();
    AgentStatus::Reported(line.chars().take(STATUS_TEXT_MAX).collect())
}

/// Ask the agent for its status, skipping the request entirely when the
/// service is not running.
pub fn probe_status<H: AgentHttp + ?Sized>(http: &H, running: bool) -> AgentStatus {
    if !running {
        return AgentStatus::NotRunning;
    }
    match http.get("/status") {
        Ok(reply) => parse_status_body(&reply.body),
        Err(e) => {
            tracing::debug!("status probe: {e:#}");
            AgentStatus::NotResponding
        }
    }
}

/// Result of a force-inventory request from the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryOutcome {
    Accepted,
    /// The agent answered with something other than 200.
    NotAllowed(u16),
    NoResponse,
    NotRunning,
    /// The service runs but the tray still shows the error state.
    AgentError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Error,
}

/// A modal message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: &'static str,
    pub message: &'static str,
}

impl InventoryOutcome {
    pub fn dialog(self) -> Dialog {
        let (kind, message) = match self {
            Self::Accepted => (
                DialogKind::Info,
                "Inventory requested. The agent will send it to the server shortly.",
            ),
            Self::NotAllowed(_) => (
                DialogKind::Error,
                "The agent refused the inventory request. Check that this machine is in the agent's httpd-trust list.",
            ),
            Self::NoResponse => (
                DialogKind::Error,
                "The agent did not respond to the inventory request.",
            ),
            Self::NotRunning => (DialogKind::Error, "The GLPI Agent service is not running."),
            Self::AgentError => (
                DialogKind::Error,
                "The GLPI Agent is in an error state. Try again once it is running.",
            ),
        };
        let title = match kind {
            DialogKind::Info => APP_TITLE,
            DialogKind::Error => "Error",
        };
        Dialog {
            kind,
            title,
            message,
        }
    }
}

/// Ask the agent to run an inventory now.  Never retried.  Only the status
/// code counts; whatever body follows it is ignored.
pub fn force_inventory<H: AgentHttp + ?Sized>(
    http: &H,
    running: bool,
    icon_healthy: bool,
) -> InventoryOutcome {
    if !running {
        return InventoryOutcome::NotRunning;
    }
    if !icon_healthy {
        return InventoryOutcome::AgentError;
    }
    match http.get_status("/now") {
        Ok(200) => InventoryOutcome::Accepted,
        Ok(status) => {
            tracing::info!("inventory request refused with HTTP {status}");
            InventoryOutcome::NotAllowed(status)
        }
        Err(e) => {
            tracing::info!("inventory request failed: {e:#}");
            InventoryOutcome::NoResponse
        }
    }
}
