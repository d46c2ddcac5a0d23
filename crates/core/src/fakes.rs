//! In-memory stand-ins for the registry, SCM and agent httpd.  Each fake
//! counts the handles it has handed out and not yet seen dropped.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use anyhow::{anyhow, bail, Result};

use crate::probe::{AgentHttp, HttpReply};
use crate::registry::RegistryHive;
use crate::service::ServiceControl;
use crate::status::ServiceState;

/// Live-handle counter shared between a fake and the handles it issued.
#[derive(Clone, Default)]
pub struct HandleCount(Rc<Cell<usize>>);

impl HandleCount {
    pub fn get(&self) -> usize {
        self.0.get()
    }

    fn acquire(&self) -> Handle {
        self.0.set(self.0.get() + 1);
        Handle(self.clone())
    }
}

pub struct Handle(HandleCount);

impl Drop for Handle {
    fn drop(&mut self) {
        let c = &(self.0).0;
        c.set(c.get() - 1);
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum RegValue {
    Str(String),
    Dword(u32),
}

#[derive(Default)]
pub struct FakeRegistry {
    keys: HashMap<String, HashMap<String, RegValue>>,
    pub opened: RefCell<Vec<String>>,
    pub fail_all: Cell<bool>,
    pub live: HandleCount,
}

pub struct FakeKey {
    path: String,
    _handle: Handle,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, path: &str) -> Self {
        self.keys.entry(path.to_string()).or_default();
        self
    }

    pub fn with_value(mut self, path: &str, name: &str, value: RegValue) -> Self {
        self.keys
            .entry(path.to_string())
            .or_default()
            .insert(name.to_string(), value);
        self
    }
}

impl RegistryHive for FakeRegistry {
    type Key = FakeKey;

    fn open_key(&self, path: &str) -> Result<FakeKey> {
        self.opened.borrow_mut().push(path.to_string());
        if self.fail_all.get() || !self.keys.contains_key(path) {
            bail!("key not found: {path}");
        }
        Ok(FakeKey {
            path: path.to_string(),
            _handle: self.live.acquire(),
        })
    }

    fn read_string(&self, key: &FakeKey, name: &str) -> Result<String> {
        match self.keys[&key.path].get(name) {
            Some(RegValue::Str(s)) => Ok(s.clone()),
            Some(RegValue::Dword(_)) => bail!("{name} is not a string"),
            None => bail!("value not found: {name}"),
        }
    }

    fn read_dword(&self, key: &FakeKey, name: &str) -> Result<u32> {
        match self.keys[&key.path].get(name) {
            Some(RegValue::Dword(d)) => Ok(*d),
            Some(RegValue::Str(_)) => bail!("{name} is not a DWORD"),
            None => bail!("value not found: {name}"),
        }
    }
}

// ── Service Control Manager ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScmFailure {
    Connect,
    Open,
    Query,
}

pub struct FakeScm {
    pub raw_state: Cell<u32>,
    pub fail_at: Cell<Option<ScmFailure>>,
    pub live: HandleCount,
}

pub struct FakeManager(Handle);
pub struct FakeService(Handle);

impl FakeScm {
    pub fn with_state(raw_state: u32) -> Self {
        Self {
            raw_state: Cell::new(raw_state),
            fail_at: Cell::new(None),
            live: HandleCount::default(),
        }
    }

    pub fn running() -> Self {
        Self::with_state(4)
    }

    pub fn stopped() -> Self {
        Self::with_state(1)
    }

    pub fn set_running(&self, running: bool) {
        self.raw_state.set(if running { 4 } else { 1 });
    }
}

impl ServiceControl for FakeScm {
    type Manager = FakeManager;
    type Service = FakeService;

    fn connect(&self) -> Result<FakeManager> {
        if self.fail_at.get() == Some(ScmFailure::Connect) {
            bail!("access denied");
        }
        Ok(FakeManager(self.live.acquire()))
    }

    fn open_service(&self, _manager: &FakeManager, name: &str) -> Result<FakeService> {
        if self.fail_at.get() == Some(ScmFailure::Open) {
            bail!("service {name} does not exist");
        }
        Ok(FakeService(self.live.acquire()))
    }

    fn query_state(&self, _service: &FakeService) -> Result<ServiceState> {
        if self.fail_at.get() == Some(ScmFailure::Query) {
            bail!("query failed");
        }
        Ok(ServiceState::from_raw(self.raw_state.get()))
    }
}

// ── Agent httpd ──────────────────────────────────────────────────────────────

/// Replies are served in order; once the queue is empty every request fails
/// as if the agent were unreachable.
#[derive(Default)]
pub struct FakeHttp {
    replies: RefCell<VecDeque<Option<HttpReply>>>,
    pub requests: RefCell<Vec<String>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: &str) -> Self {
        self.replies.borrow_mut().push_back(Some(HttpReply {
            status,
            body: body.as_bytes().to_vec(),
        }));
        self
    }

    pub fn unreachable(self) -> Self {
        self.replies.borrow_mut().push_back(None);
        self
    }

    pub fn push_reply(&self, status: u16, body: &str) {
        self.replies.borrow_mut().push_back(Some(HttpReply {
            status,
            body: body.as_bytes().to_vec(),
        }));
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl AgentHttp for FakeHttp {
    fn get(&self, path: &str) -> Result<HttpReply> {
        self.requests.borrow_mut().push(path.to_string());
        self.replies
            .borrow_mut()
            .pop_front()
            .flatten()
            .ok_or_else(|| anyhow!("connection refused"))
    }

    fn get_status(&self, path: &str) -> Result<u16> {
        self.get(path).map(|reply| reply.status)
    }
}
