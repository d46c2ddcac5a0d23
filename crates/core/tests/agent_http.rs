//! Drives the real reqwest-backed `AgentConnection` against a local axum
//! server standing in for the agent's httpd.

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::sync::mpsc;
use std::time::Duration;

use axum::{
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};

use glpi_monitor_core::probe::{
    force_inventory, probe_status, AgentConnection, AgentHttp, InventoryOutcome,
};
use glpi_monitor_core::status::AgentStatus;

/// Serve `router` on an ephemeral loopback port from a background thread.
/// The blocking client must not run inside a tokio runtime, so the server
/// gets its own.
fn spawn_agent(router: Router) -> SocketAddr {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("building runtime");
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("binding test listener");
            tx.send(listener.local_addr().expect("local addr")).unwrap();
            axum::serve(listener, router).await.expect("serving");
        });
    });
    rx.recv().expect("server address")
}

fn connect(addr: SocketAddr) -> AgentConnection {
    AgentConnection::new(addr.port(), "GLPI-AgentMonitor/0.3", Duration::from_secs(5)).unwrap()
}

/// A port nothing listens on.
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn status_probe_strips_prefix() {
    let addr = spawn_agent(Router::new().route("/status", get(|| async { "status: waiting" })));
    let conn = connect(addr);
    assert_eq!(conn.base_url(), format!("http://127.0.0.1:{}", addr.port()));
    assert_eq!(probe_status(&conn, true), AgentStatus::Reported("waiting".into()));
}

#[test]
fn status_probe_sends_user_agent() {
    let addr = spawn_agent(Router::new().route(
        "/status",
        get(|headers: HeaderMap| async move {
            let ua = headers
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            format!("status: {ua}")
        }),
    ));
    let conn = connect(addr);
    assert_eq!(
        probe_status(&conn, true),
        AgentStatus::Reported("GLPI-AgentMonitor/0.3".into())
    );
}

#[test]
fn short_status_body_is_malformed() {
    let addr = spawn_agent(Router::new().route("/status", get(|| async { "busy" })));
    assert_eq!(probe_status(&connect(addr), true), AgentStatus::MalformedResponse);
}

#[test]
fn unreachable_agent_is_not_responding() {
    let conn =
        AgentConnection::new(closed_port(), "GLPI-AgentMonitor/0.3", Duration::from_secs(2)).unwrap();
    assert!(conn.get("/status").is_err());
    assert_eq!(probe_status(&conn, true), AgentStatus::NotResponding);
}

#[test]
fn inventory_outcomes_follow_status_code() {
    let addr = spawn_agent(Router::new().route("/now", get(|| async { (StatusCode::OK, "OK") })));
    assert_eq!(force_inventory(&connect(addr), true, true), InventoryOutcome::Accepted);

    let addr = spawn_agent(
        Router::new().route("/now", get(|| async { (StatusCode::FORBIDDEN, "Access denied") })),
    );
    assert_eq!(
        force_inventory(&connect(addr), true, true),
        InventoryOutcome::NotAllowed(403)
    );

    let conn =
        AgentConnection::new(closed_port(), "GLPI-AgentMonitor/0.3", Duration::from_secs(2)).unwrap();
    assert_eq!(force_inventory(&conn, true, true), InventoryOutcome::NoResponse);
}

/// The agent sends its status line and then stalls mid-body.  The inventory
/// request was accepted; the body is none of our business.
#[test]
fn inventory_accepted_before_body_arrives() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = [0u8; 1024];
        let _ = stream.read(&mut request);
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nok")
            .unwrap();
        stream.flush().unwrap();
        std::thread::sleep(Duration::from_secs(5));
    });

    let conn = AgentConnection::new(port, "GLPI-AgentMonitor/0.3", Duration::from_secs(1)).unwrap();
    assert_eq!(force_inventory(&conn, true, true), InventoryOutcome::Accepted);
}
