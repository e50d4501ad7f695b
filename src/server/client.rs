// src/server/client.rs

//! Browser side of live reload, served from memory.

pub const CLIENT_PATH: &str = "/__assetflow/client.js";
pub const SOCKET_PATH: &str = "/__assetflow/ws";

pub const CLIENT_TAG: &str = r#"<script src="/__assetflow/client.js"></script>"#;

const SOCKET_PORT_SLOT: &str = "__ASSETFLOW_SOCKET_PORT__";

const CLIENT_JS: &str = r#"(function () {
  "use strict";
  var scheme = location.protocol === "https:" ? "wss://" : "ws://";

  function refreshStyles(paths) {
    var matched = false;
    document.querySelectorAll('link[rel="stylesheet"]').forEach(function (link) {
      var url = new URL(link.href, location.href);
      var hit = paths.length === 0 || paths.some(function (p) {
        return url.pathname.endsWith(p);
      });
      if (hit) {
        url.searchParams.set("assetflow", Date.now().toString());
        link.href = url.toString();
        matched = true;
      }
    });
    if (!matched) {
      location.reload();
    }
  }

  function connect() {
    var socket = new WebSocket(
      scheme + location.hostname + ":__ASSETFLOW_SOCKET_PORT__/__assetflow/ws"
    );
    socket.onmessage = function (event) {
      var msg = JSON.parse(event.data);
      if (msg.type === "css") {
        refreshStyles(msg.paths || []);
      } else {
        location.reload();
      }
    };
    socket.onclose = function () {
      setTimeout(connect, 1000);
    };
  }

  connect();
})();
"#;

/// The client script, pointed at the live-reload socket's port.
pub fn client_script(socket_port: u16) -> String {
    CLIENT_JS.replace(SOCKET_PORT_SLOT, &socket_port.to_string())
}

/// Insert the client script tag before the last `</body>`, or append it.
pub fn inject_client(html: &[u8]) -> Vec<u8> {
    const CLOSE_BODY: &[u8] = b"</body>";
    let tag = CLIENT_TAG.as_bytes();

    let mut out = Vec::with_capacity(html.len() + tag.len());
    match html
        .windows(CLOSE_BODY.len())
        .rposition(|w| w.eq_ignore_ascii_case(CLOSE_BODY))
    {
        Some(pos) => {
            out.extend_from_slice(&html[..pos]);
            out.extend_from_slice(tag);
            out.extend_from_slice(&html[pos..]);
        }
        None => {
            out.extend_from_slice(html);
            out.extend_from_slice(tag);
        }
    }
    out
}
