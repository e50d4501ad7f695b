// src/server/socket.rs

//! Live-reload websocket endpoint.
//!
//! Browsers connect to a second listener on the dev server's host (OS-picked
//! port, advertised through the client script). Each client gets a thread
//! that polls the socket for control frames between hub notifications, so
//! close and ping frames are answered and a vanished client is noticed
//! without waiting for the next publish.

use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, warn};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Message;
use tungstenite::{Error as WsError, WebSocket};

use super::client::SOCKET_PATH;
use super::reload::{Notification, ReloadHub};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub(super) struct ReloadSocket {
    addr: SocketAddr,
    stopping: Arc<AtomicBool>,
    acceptor: Option<JoinHandle<()>>,
}

impl ReloadSocket {
    pub(super) fn bind(host: &str, hub: ReloadHub) -> Result<Self> {
        let listener = TcpListener::bind((host, 0))
            .with_context(|| format!("binding live-reload socket on {host}"))?;
        let addr = listener.local_addr()?;
        let stopping = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&stopping);
        let acceptor = thread::Builder::new()
            .name("assetflow-ws-accept".to_string())
            .spawn(move || accept_loop(listener, hub, flag))
            .context("spawning websocket acceptor")?;

        debug!(%addr, "live-reload socket listening");
        Ok(Self {
            addr,
            stopping,
            acceptor: Some(acceptor),
        })
    }

    pub(super) fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub(super) fn stop(&mut self) {
        if self.stopping.swap(true, Ordering::SeqCst) {
            return;
        }
        // Wake the blocking accept so the loop sees the flag.
        let _ = TcpStream::connect(wake_addr(self.addr));
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
    }
}

impl Drop for ReloadSocket {
    fn drop(&mut self) {
        self.stop();
    }
}

fn wake_addr(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => (Ipv4Addr::LOCALHOST, addr.port()).into(),
        IpAddr::V6(ip) if ip.is_unspecified() => (Ipv6Addr::LOCALHOST, addr.port()).into(),
        _ => addr,
    }
}

fn accept_loop(listener: TcpListener, hub: ReloadHub, stopping: Arc<AtomicBool>) {
    for stream in listener.incoming() {
        if stopping.load(Ordering::SeqCst) {
            break;
        }
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                debug!(error = %err, "live-reload accept failed");
                continue;
            }
        };
        let rx = hub.subscribe();
        let flag = Arc::clone(&stopping);
        let spawned = thread::Builder::new()
            .name("assetflow-ws".to_string())
            .spawn(move || serve_client(stream, rx, flag));
        if let Err(err) = spawned {
            warn!(error = %err, "could not spawn live-reload client thread");
        }
    }
    debug!("live-reload acceptor finished");
}

fn check_path(request: &Request, response: Response) -> std::result::Result<Response, ErrorResponse> {
    if request.uri().path() == SOCKET_PATH {
        return Ok(response);
    }
    let mut rejection = ErrorResponse::new(Some(format!("no websocket at {}", request.uri().path())));
    *rejection.status_mut() = StatusCode::NOT_FOUND;
    Err(rejection)
}

fn serve_client(stream: TcpStream, mut rx: Receiver<Notification>, stopping: Arc<AtomicBool>) {
    let mut socket = match tungstenite::accept_hdr(stream, check_path) {
        Ok(socket) => socket,
        Err(err) => {
            debug!(error = %err, "live-reload handshake failed");
            return;
        }
    };
    if let Err(err) = socket.get_ref().set_read_timeout(Some(POLL_INTERVAL)) {
        debug!(error = %err, "cannot poll live-reload client");
        return;
    }
    debug!("live-reload client connected");

    while !stopping.load(Ordering::SeqCst) {
        if !poll_client(&mut socket) || !forward_pending(&mut socket, &mut rx) {
            break;
        }
    }
    let _ = socket.close(None);
    let _ = socket.flush();
    debug!("live-reload client disconnected");
}

/// Read whatever the client sent within one poll interval. Pings and close
/// frames are answered by tungstenite on the next read or write. Returns
/// false once the connection is gone.
fn poll_client(socket: &mut WebSocket<TcpStream>) -> bool {
    match socket.read() {
        Ok(Message::Close(frame)) => {
            debug!(?frame, "live-reload client sent close");
            true
        }
        Ok(_) => true,
        Err(WsError::Io(err)) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => true,
        Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => false,
        Err(err) => {
            debug!(error = %err, "live-reload client read failed");
            false
        }
    }
}

fn forward_pending(socket: &mut WebSocket<TcpStream>, rx: &mut Receiver<Notification>) -> bool {
    loop {
        match rx.try_recv() {
            Ok(notification) => {
                if let Err(err) = socket.send(Message::Text(notification.to_json().into())) {
                    debug!(error = %err, "live-reload send failed");
                    return false;
                }
            }
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "live-reload client lagging; notifications dropped");
            }
            Err(TryRecvError::Closed) => return false,
        }
    }
}
