// tests/dev_server.rs

mod common;
use crate::common::{init_tracing, write_tree};

use std::error::Error;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::time::{Duration, Instant};

use assetflow::errors::AssetflowError;
use assetflow::server::client::{CLIENT_PATH, CLIENT_TAG, SOCKET_PATH};
use assetflow::server::http::{mime_for, resolve_path};
use assetflow::server::{DevServer, Notification, ReloadHub};

type TestResult = Result<(), Box<dyn Error>>;

/// Minimal HTTP/1.1 client: returns the raw response text.
fn http(addr: SocketAddr, method: &str, path: &str) -> Result<String, Box<dyn Error>> {
    let mut stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    write!(
        stream,
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
    )?;
    let mut response = Vec::new();
    stream.read_to_end(&mut response)?;
    Ok(String::from_utf8_lossy(&response).into_owned())
}

fn status_line(response: &str) -> &str {
    response.lines().next().unwrap_or_default()
}

fn socket_url(server: &DevServer) -> String {
    format!("ws://{}{SOCKET_PATH}", server.reload_addr())
}

fn wait_for_subscribers(hub: &ReloadHub, expected: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while hub.subscriber_count() != expected {
        assert!(
            Instant::now() < deadline,
            "expected {expected} live-reload subscribers, have {}",
            hub.subscriber_count()
        );
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn site() -> Result<tempfile::TempDir, Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    write_tree(
        dir.path(),
        &[
            ("index.html", "<html><body><h1>Home</h1></body></html>"),
            ("docs/index.html", "<html><body>Docs</body></html>"),
            ("css/style.min.css", "h1{color:red}"),
        ],
    );
    Ok(dir)
}

#[test]
fn serves_html_with_reload_client_injected() -> TestResult {
    init_tracing();

    let dir = site()?;
    let server = DevServer::start("127.0.0.1", 0, dir.path(), ReloadHub::new())?;

    let response = http(server.addr(), "GET", "/")?;
    assert!(status_line(&response).contains("200"), "got {response}");
    assert!(response.contains("text/html"));
    assert!(response.contains(&format!("{CLIENT_TAG}</body>")), "got {response}");

    let docs = http(server.addr(), "GET", "/docs/")?;
    assert!(docs.contains("Docs"));
    assert!(docs.contains(CLIENT_TAG));

    server.shutdown();
    Ok(())
}

#[test]
fn serves_static_files_and_client_script() -> TestResult {
    init_tracing();

    let dir = site()?;
    let server = DevServer::start("127.0.0.1", 0, dir.path(), ReloadHub::new())?;

    let css = http(server.addr(), "GET", "/css/style.min.css?v=3")?;
    assert!(status_line(&css).contains("200"));
    assert!(css.contains("text/css"));
    assert!(css.ends_with("h1{color:red}"), "css is served untouched: {css}");

    let client = http(server.addr(), "GET", CLIENT_PATH)?;
    assert!(status_line(&client).contains("200"));
    assert!(client.contains("WebSocket"));
    let socket_url = format!(":{}{SOCKET_PATH}", server.reload_addr().port());
    assert!(client.contains(&socket_url), "client targets the reload socket: {client}");

    let missing = http(server.addr(), "GET", "/nope.html")?;
    assert!(status_line(&missing).contains("404"), "got {missing}");

    let post = http(server.addr(), "POST", "/")?;
    assert!(status_line(&post).contains("405"), "got {post}");

    server.shutdown();
    Ok(())
}

#[test]
fn occupied_port_is_reported() -> TestResult {
    init_tracing();

    let dir = site()?;
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();

    let result = DevServer::start("127.0.0.1", port, dir.path(), ReloadHub::new());
    match result {
        Err(AssetflowError::PortInUse { port: reported, .. }) => assert_eq!(reported, port),
        other => panic!("expected PortInUse, got {other:?}"),
    }
    Ok(())
}

#[test]
fn websocket_clients_receive_notifications() -> TestResult {
    init_tracing();

    let dir = site()?;
    let hub = ReloadHub::new();
    let server = DevServer::start("127.0.0.1", 0, dir.path(), hub.clone())?;

    let (mut socket, response) = tungstenite::connect(socket_url(&server))?;
    assert_eq!(response.status().as_u16(), 101);
    wait_for_subscribers(&hub, 1);

    hub.publish(Notification::Css {
        paths: vec!["/css/style.min.css".to_string()],
    });

    let message = socket.read()?;
    let payload: serde_json::Value = serde_json::from_str(message.to_text()?)?;
    assert_eq!(payload["type"], "css");
    assert_eq!(payload["paths"][0], "/css/style.min.css");

    socket.close(None)?;
    drop(server);
    Ok(())
}

#[test]
fn closed_clients_are_answered_and_unsubscribed() -> TestResult {
    init_tracing();

    let dir = site()?;
    let hub = ReloadHub::new();
    let server = DevServer::start("127.0.0.1", 0, dir.path(), hub.clone())?;

    let (mut socket, _) = tungstenite::connect(socket_url(&server))?;
    wait_for_subscribers(&hub, 1);

    // No publish happens: the server has to notice the close on its own.
    socket.close(None)?;
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        match socket.read() {
            Ok(_) => assert!(Instant::now() < deadline, "close never acknowledged"),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => break,
            Err(err) => return Err(err.into()),
        }
    }
    wait_for_subscribers(&hub, 0);

    server.shutdown();
    Ok(())
}

#[test]
fn dropped_connections_release_their_subscription() -> TestResult {
    init_tracing();

    let dir = site()?;
    let hub = ReloadHub::new();
    let server = DevServer::start("127.0.0.1", 0, dir.path(), hub.clone())?;

    let (socket, _) = tungstenite::connect(socket_url(&server))?;
    wait_for_subscribers(&hub, 1);
    drop(socket);
    wait_for_subscribers(&hub, 0);

    server.shutdown();
    Ok(())
}

#[test]
fn reload_socket_only_upgrades_its_own_path() -> TestResult {
    init_tracing();

    let dir = site()?;
    let server = DevServer::start("127.0.0.1", 0, dir.path(), ReloadHub::new())?;

    let url = format!("ws://{}/elsewhere", server.reload_addr());
    match tungstenite::connect(url) {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status().as_u16(), 404),
        other => panic!("expected a 404 handshake rejection, got {:?}", other.map(|_| ())),
    }

    server.shutdown();
    Ok(())
}

#[test]
fn notifications_serialise_with_a_type_tag() {
    init_tracing();

    assert_eq!(
        Notification::reload("pages updated").to_json(),
        r#"{"type":"reload","reason":"pages updated"}"#
    );
    assert_eq!(
        Notification::Css {
            paths: vec!["/css/a.css".to_string()]
        }
        .to_json(),
        r#"{"type":"css","paths":["/css/a.css"]}"#
    );
}

#[test]
fn publishing_without_subscribers_is_harmless() {
    init_tracing();

    let hub = ReloadHub::new();
    assert_eq!(hub.publish(Notification::reload("x")), 0);

    let _rx = hub.subscribe();
    assert_eq!(hub.publish(Notification::reload("y")), 1);
}

#[test]
fn path_resolution_stays_inside_root() -> TestResult {
    init_tracing();

    let dir = site()?;
    let root = dir.path();

    let index = resolve_path("/", root).expect("root index");
    assert!(index.ends_with("index.html"));
    assert!(resolve_path("/docs", root).expect("dir index").ends_with("docs/index.html"));
    assert!(resolve_path("/css/style%2Emin.css", root).is_some());
    assert!(resolve_path("/../etc/passwd", root).is_none());
    assert!(resolve_path("/css/%2E%2E/%2E%2E/secret", root).is_none());
    assert!(resolve_path("/missing.css", root).is_none());
    Ok(())
}

#[test]
fn content_types_follow_extensions() {
    init_tracing();

    assert!(mime_for(Path::new("a.html")).starts_with("text/html"));
    assert_eq!(mime_for(Path::new("a.woff2")), "font/woff2");
    assert_eq!(mime_for(Path::new("A.AVIF")), "image/avif");
    assert_eq!(mime_for(Path::new("blob.bin")), "application/octet-stream");
}
