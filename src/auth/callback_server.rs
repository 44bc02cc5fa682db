//! Loopback redirect listener for the consent flow
//!
//! Binds an ephemeral port on 127.0.0.1 and waits for the browser to be
//! redirected back with an authorization code.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;
use crate::Result;
use crate::error::Error;

/// Idle connections (browser preconnects) are dropped after this
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(2);

const SUCCESS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>gdocs-mcp | Authorization complete</title></head>
<body style="font-family: system-ui, sans-serif; text-align: center; margin-top: 15vh;">
    <h1>Authorization complete</h1>
    <p>Google Docs access was granted. You can close this window.</p>
</body>
</html>"#;

const ERROR_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>gdocs-mcp | Authorization failed</title></head>
<body style="font-family: system-ui, sans-serif; text-align: center; margin-top: 15vh;">
    <h1>Authorization failed</h1>
    <p>Access was not granted. Check the server log for details.</p>
</body>
</html>"#;

/// What the browser redirect carried
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    Code(String),
    /// Not an OAuth redirect (favicon and similar)
    Ignored,
}

/// Listener bound to an ephemeral loopback port
pub struct CallbackListener {
    listener: TcpListener,
    port: u16,
}

impl CallbackListener {
    pub async fn bind() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await
            .map_err(|e| Error::Auth(format!("Failed to start callback listener: {}", e)))?;
        let port = listener.local_addr()
            .map_err(|e| Error::Auth(format!("Failed to read callback listener address: {}", e)))?
            .port();

        tracing::info!("Callback listener on http://127.0.0.1:{}/", port);
        Ok(Self { listener, port })
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/", self.port)
    }

    /// Block until a redirect carrying a code or an error arrives
    pub async fn wait_for_code(self, expected_state: &str) -> Result<String> {
        loop {
            let (mut socket, _) = self.listener.accept().await
                .map_err(|e| Error::Auth(format!("Failed to accept callback connection: {}", e)))?;

            let mut buffer = vec![0u8; 8192];
            let n = match tokio::time::timeout(REQUEST_READ_TIMEOUT, socket.read(&mut buffer)).await {
                Ok(Ok(n)) if n > 0 => n,
                Ok(Ok(_)) => {
                    tracing::debug!("Callback connection closed without a request");
                    continue;
                }
                Ok(Err(e)) => {
                    tracing::debug!("Failed to read callback request: {}", e);
                    continue;
                }
                Err(_) => {
                    tracing::debug!("Callback connection idle, dropping it");
                    continue;
                }
            };
            let request = String::from_utf8_lossy(&buffer[..n]);

            match parse_callback_request(&request, expected_state) {
                Ok(CallbackOutcome::Code(code)) => {
                    respond(&mut socket, "200 OK", SUCCESS_HTML).await;
                    return Ok(code);
                }
                Ok(CallbackOutcome::Ignored) => {
                    respond(&mut socket, "404 Not Found", "").await;
                }
                Err(e) => {
                    respond(&mut socket, "400 Bad Request", ERROR_HTML).await;
                    return Err(e);
                }
            }
        }
    }
}

async fn respond(socket: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Parse the request line of a redirect: `GET /?code=xxx&state=yyy HTTP/1.1`
fn parse_callback_request(request: &str, expected_state: &str) -> Result<CallbackOutcome> {
    let Some(target) = request.lines().next().and_then(|line| line.split_whitespace().nth(1)) else {
        return Ok(CallbackOutcome::Ignored);
    };

    let Ok(url) = Url::parse(&format!("http://localhost{}", target)) else {
        return Ok(CallbackOutcome::Ignored);
    };

    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut error_description = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(err) = error {
        let description = error_description.unwrap_or_else(|| "no description".to_string());
        return Err(Error::Auth(format!("Authorization denied: {} - {}", err, description)));
    }

    let Some(code) = code else {
        return Ok(CallbackOutcome::Ignored);
    };

    match state.as_deref() {
        Some(s) if s == expected_state => Ok(CallbackOutcome::Code(code)),
        Some(s) => Err(Error::Auth(format!("State mismatch: expected {}, got {}", expected_state, s))),
        None => Err(Error::Auth("Missing state parameter".to_string())),
    }
}
