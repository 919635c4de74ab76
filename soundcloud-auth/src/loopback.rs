//! Loopback HTTP listener that captures the redirect on desktop.
//!
//! Register `http://127.0.0.1:<port><path>` as the redirect URI, open the
//! login in a browser and block on [`LoopbackRedirect::wait_for_callback`].
//! The returned URL is what `can_authenticate` and `get_token` expect.

use std::io;
use std::time::Duration;
use std::time::Instant;

use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

use crate::error::AuthError;

const SUCCESS_PAGE: &str = "<!DOCTYPE html><html><head><title>SoundCloud</title></head>\
    <body><h1>Logged in</h1><p>You can close this window and return to the terminal.</p>\
    </body></html>";

pub struct LoopbackRedirect {
    server: Server,
    host: String,
    port: u16,
    path: String,
}

impl LoopbackRedirect {
    /// Binds `127.0.0.1:port`; `0` picks a free port.
    ///
    /// `host` is how the registered redirect URI names this machine
    /// (`127.0.0.1` or `localhost`); callback URLs are rebuilt with it.
    pub fn bind(host: &str, port: u16, path: &str) -> Result<Self, AuthError> {
        let server = Server::http(("127.0.0.1", port))
            .map_err(|err| AuthError::Io(io::Error::other(err.to_string())))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| AuthError::Io(io::Error::other("listener has no ip address")))?;

        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Ok(Self {
            server,
            host: host.to_string(),
            port,
            path,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }

    /// Blocks until the redirect path is hit and returns the full URL.
    /// Requests for other paths get a 404 and are ignored.
    pub fn wait_for_callback(&self, timeout: Duration) -> Result<String, AuthError> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(AuthError::CallbackTimeout);
            }
            let Some(request) = self.server.recv_timeout(remaining)? else {
                return Err(AuthError::CallbackTimeout);
            };

            let request_url = request.url().to_string();
            let path = request_url.split('?').next().unwrap_or_default();
            if path != self.path {
                tracing::debug!(%request_url, "ignoring request outside the redirect path");
                let not_found = Response::from_string("not found").with_status_code(404);
                if let Err(err) = request.respond(not_found) {
                    tracing::debug!("failed to answer stray request: {err}");
                }
                continue;
            }

            let mut response = Response::from_string(SUCCESS_PAGE);
            if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"text/html"[..]) {
                response = response.with_header(header);
            }
            if let Err(err) = request.respond(response) {
                tracing::warn!("failed to answer redirect: {err}");
            }
            return Ok(format!("http://{}:{}{request_url}", self.host, self.port));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::io::Write;
    use std::net::TcpStream;

    use super::*;

    fn get(port: u16, target: &str) -> String {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        write!(
            stream,
            "GET {target} HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n"
        )
        .unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).unwrap();
        reply
    }

    #[test]
    fn returns_full_redirect_url() {
        let loopback = LoopbackRedirect::bind("127.0.0.1", 0, "callback").unwrap();
        let port = loopback.port();
        assert_eq!(loopback.redirect_uri(), format!("http://127.0.0.1:{port}/callback"));

        let client = std::thread::spawn(move || {
            let miss = get(port, "/favicon.ico");
            let hit = get(port, "/callback?code=abc123");
            (miss, hit)
        });

        let url = loopback.wait_for_callback(Duration::from_secs(10)).unwrap();
        let (miss, hit) = client.join().unwrap();

        assert_eq!(url, format!("http://127.0.0.1:{port}/callback?code=abc123"));
        assert!(miss.starts_with("HTTP/1.1 404"));
        assert!(hit.starts_with("HTTP/1.1 200"));
    }

    #[test]
    fn callback_keeps_the_configured_host_name() {
        let loopback = LoopbackRedirect::bind("localhost", 0, "/callback").unwrap();
        let port = loopback.port();
        let config = crate::AuthConfig::new("abc", loopback.redirect_uri());

        let client = std::thread::spawn(move || get(port, "/callback?code=abc123"));
        let url = loopback.wait_for_callback(Duration::from_secs(10)).unwrap();
        client.join().unwrap();

        assert_eq!(url, format!("http://localhost:{port}/callback?code=abc123"));
        assert!(config.can_handle(Some(&url)));
        assert_eq!(config.extract_code(Some(&url)).as_deref(), Some("abc123"));
    }

    #[test]
    fn times_out_without_a_request() {
        let loopback = LoopbackRedirect::bind("127.0.0.1", 0, "/cb").unwrap();
        let err = loopback
            .wait_for_callback(Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, AuthError::CallbackTimeout));
    }
}
