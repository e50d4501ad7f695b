// src/server/http.rs

//! Request handling: static files and the reload client script.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use percent_encoding::percent_decode_str;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::debug;

use super::client::{client_script, inject_client, CLIENT_PATH};

mod mime {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const SVG: &str = "image/svg+xml";
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const AVIF: &str = "image/avif";
    pub const ICO: &str = "image/x-icon";
    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const OTF: &str = "font/otf";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("html" | "htm") => mime::HTML,
        Some("css") => mime::CSS,
        Some("js" | "mjs") => mime::JAVASCRIPT,
        Some("json" | "map") => mime::JSON,
        Some("txt") => mime::PLAIN,
        Some("svg") => mime::SVG,
        Some("png") => mime::PNG,
        Some("jpg" | "jpeg") => mime::JPEG,
        Some("gif") => mime::GIF,
        Some("webp") => mime::WEBP,
        Some("avif") => mime::AVIF,
        Some("ico") => mime::ICO,
        Some("woff") => mime::WOFF,
        Some("woff2") => mime::WOFF2,
        Some("ttf") => mime::TTF,
        Some("otf") => mime::OTF,
        _ => mime::OCTET_STREAM,
    }
}

/// Map a request URL onto a file under `root`.
///
/// Directories resolve to their `index.html`. Anything containing `..` or
/// escaping `root` through a symlink is rejected.
pub fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let clean = decoded.trim_matches('/');
    if clean.split('/').any(|seg| seg == "..") {
        return None;
    }

    let local = if clean.is_empty() {
        root.to_path_buf()
    } else {
        root.join(clean)
    };
    let canonical = local.canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }
    None
}

pub(super) fn handle_request(request: Request, root: &Path, socket_port: u16) -> Result<()> {
    let path = request
        .url()
        .split('?')
        .next()
        .unwrap_or_default()
        .to_string();

    let head = match request.method() {
        Method::Get => false,
        Method::Head => true,
        _ => return send(request, 405, mime::PLAIN, b"405 Method Not Allowed".to_vec(), false),
    };

    if path == CLIENT_PATH {
        let script = client_script(socket_port).into_bytes();
        return send(request, 200, mime::JAVASCRIPT, script, head);
    }

    match resolve_path(&path, root) {
        Some(file) => {
            let content_type = mime_for(&file);
            let body = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let body = if content_type == mime::HTML {
                inject_client(&body)
            } else {
                body
            };
            send(request, 200, content_type, body, head)
        }
        None => {
            debug!(url = %path, "not found");
            send(request, 404, mime::PLAIN, b"404 Not Found".to_vec(), head)
        }
    }
}

fn send(request: Request, status: u16, content_type: &str, body: Vec<u8>, head: bool) -> Result<()> {
    let body = if head { Vec::new() } else { body };
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", content_type)?)
        .with_header(header("Cache-Control", "no-cache")?);
    request.respond(response)?;
    Ok(())
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header {name}: {value}"))
}
