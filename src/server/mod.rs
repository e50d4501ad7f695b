// src/server/mod.rs

//! Development server.
//!
//! The configured port serves the static working tree and the live-reload
//! client script. A second, OS-assigned port on the same host carries the
//! websocket that pushes [`Notification`]s from the [`ReloadHub`]; the
//! client script is generated with that port.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::anyhow;
use tiny_http::Server;
use tracing::{debug, info};

use crate::errors::{AssetflowError, Result};

pub mod client;
pub mod http;
pub mod reload;
mod socket;

pub use reload::{Notification, ReloadHub};

use socket::ReloadSocket;

/// A running dev server. Dropping it stops accepting requests.
pub struct DevServer {
    server: Arc<Server>,
    addr: SocketAddr,
    socket: ReloadSocket,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for DevServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevServer")
            .field("addr", &self.addr)
            .field("reload_addr", &self.socket.addr())
            .finish()
    }
}

impl DevServer {
    /// Bind `host:port` and start serving `root`.
    ///
    /// Bind failure is reported as [`AssetflowError::PortInUse`]; there is no
    /// fallback port.
    pub fn start(host: &str, port: u16, root: impl Into<PathBuf>, hub: ReloadHub) -> Result<Self> {
        let root = root.into();
        let server = Server::http(format!("{host}:{port}")).map_err(|e| AssetflowError::PortInUse {
            port,
            message: e.to_string(),
        })?;
        let server = Arc::new(server);
        let addr = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| anyhow!("dev server is not bound to an IP address"))?;
        let socket = ReloadSocket::bind(host, hub)?;
        let socket_port = socket.addr().port();

        let worker_server = Arc::clone(&server);
        let worker = thread::Builder::new()
            .name("assetflow-http".to_string())
            .spawn(move || {
                for request in worker_server.incoming_requests() {
                    if let Err(err) = http::handle_request(request, &root, socket_port) {
                        debug!(error = %err, "request failed");
                    }
                }
                debug!("dev server request loop finished");
            })?;

        info!("serving at http://{addr}");
        Ok(Self {
            server,
            addr,
            socket,
            worker: Some(worker),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Address of the live-reload websocket.
    pub fn reload_addr(&self) -> SocketAddr {
        self.socket.addr()
    }

    /// Stop accepting requests and wait for the request loop to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.socket.stop();
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for DevServer {
    fn drop(&mut self) {
        self.stop();
    }
}
