//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use admission_httpd::net::ListenerError;
use admission_httpd::{AdmissionController, HttpServer, ServerConfig, Shutdown};

pub const INDEX_HTML: &str = "<html><body><h1>Welcome</h1></body></html>";
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 1, 2, 3];

/// A server running on an ephemeral port with its own document root.
pub struct TestServer {
    pub addr: SocketAddr,
    pub admission: AdmissionController,
    pub root: PathBuf,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), ListenerError>>,
}

impl TestServer {
    pub async fn start(max_per_client: usize, max_total: usize) -> Self {
        let root = document_root();
        let mut config = ServerConfig::default();
        config.files.document_root = root.clone();
        config.limits.max_per_client = max_per_client;
        config.limits.max_total = max_total;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = HttpServer::new(config);
        let admission = server.admission().clone();
        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        let handle = tokio::spawn(server.run(listener, server_shutdown));

        Self {
            addr,
            admission,
            root,
            shutdown,
            handle,
        }
    }

    /// Stop the accept loop and wait for it to return.
    pub async fn stop(self) -> Result<(), ListenerError> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(2), self.handle)
            .await
            .expect("server did not stop")
            .unwrap()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait until every global slot has been returned.
    pub async fn wait_idle(&self) {
        wait_until(|| self.admission.active_connections() == 0).await;
    }
}

/// Temporary document root with a few files.
pub fn document_root() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("admission-httpd-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(dir.join("assets")).unwrap();
    std::fs::write(dir.join("index.html"), INDEX_HTML).unwrap();
    std::fs::write(dir.join("notes.txt"), "plain text\n").unwrap();
    std::fs::write(dir.join("assets").join("logo.png"), PNG_BYTES).unwrap();
    dir
}

/// Send raw bytes, half-close, and read until the server closes the connection.
pub async fn send_raw(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    stream.shutdown().await.unwrap();
    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("response timed out")
        .unwrap();
    response
}

/// `GET <path> HTTP/1.0` with optional cookie and user agent.
pub async fn get(addr: SocketAddr, path: &str, session: Option<&str>, user_agent: Option<&str>) -> Vec<u8> {
    send_raw(addr, request(path, session, user_agent).as_bytes()).await
}

pub fn request(path: &str, session: Option<&str>, user_agent: Option<&str>) -> String {
    let mut request = format!("GET {path} HTTP/1.0\r\n");
    if let Some(agent) = user_agent {
        request.push_str(&format!("User-Agent: {agent}\r\n"));
    }
    if let Some(token) = session {
        request.push_str(&format!("Cookie: session_id={token}\r\n"));
    }
    request.push_str("\r\n");
    request
}

/// Status code from a raw response.
pub fn status(response: &[u8]) -> u16 {
    let text = String::from_utf8_lossy(response);
    text.split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or_else(|| panic!("no status line in {text:?}"))
}

/// First header value named `name` (case-insensitive).
pub fn header(response: &[u8], name: &str) -> Option<String> {
    let text = String::from_utf8_lossy(response);
    let head = text.split("\r\n\r\n").next()?;
    head.lines().skip(1).find_map(|line| {
        let (n, v) = line.split_once(':')?;
        n.trim().eq_ignore_ascii_case(name).then(|| v.trim().to_string())
    })
}

pub fn body(response: &[u8]) -> &[u8] {
    let split = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no header terminator");
    &response[split + 4..]
}

/// Session token from a `Set-Cookie: session_id=<token>; HttpOnly` header.
pub fn issued_token(response: &[u8]) -> Option<String> {
    let cookie = header(response, "set-cookie")?;
    let value = cookie.split(';').next()?.trim();
    value.strip_prefix("session_id=").map(str::to_string)
}

/// Poll `condition` for up to two seconds.
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(condition(), "condition not reached in time");
}
