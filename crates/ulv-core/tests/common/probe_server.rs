//! Minimal HTTP/1.1 server with scripted per-path responses for liveness
//! tests.
//!
//! Each route carries independent HEAD and GET scripts. The server records
//! request counts per (method, path) and the headers of the last request so
//! tests can assert on probe traffic.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One scripted response.
#[derive(Debug, Clone)]
pub struct Script {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: Option<&'static str>,
    pub location: Option<String>,
    pub body: Vec<u8>,
    /// Sleep before answering, to simulate a slow server.
    pub delay: Option<Duration>,
}

impl Script {
    pub fn status(status: u16, reason: &'static str) -> Self {
        Self {
            status,
            reason,
            content_type: None,
            location: None,
            body: Vec::new(),
            delay: None,
        }
    }

    pub fn ok() -> Self {
        Self::status(200, "OK")
    }

    pub fn redirect(location: &str) -> Self {
        let mut script = Self::status(301, "Moved Permanently");
        script.location = Some(location.to_string());
        script
    }

    pub fn with_body(mut self, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        self.content_type = Some(content_type);
        self.body = body.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A path with its HEAD and GET scripts.
pub struct Route {
    pub path: &'static str,
    pub head: Script,
    pub get: Script,
}

impl Route {
    /// Same script for HEAD and GET.
    pub fn same(path: &'static str, script: Script) -> Self {
        Self {
            path,
            head: script.clone(),
            get: script,
        }
    }

    /// Different scripts per method (e.g. HEAD blocked, GET fine).
    pub fn split(path: &'static str, head: Script, get: Script) -> Self {
        Self { path, head, get }
    }
}

pub struct ProbeServer {
    base: String,
    hits: Arc<Mutex<HashMap<(String, String), usize>>>,
    last_headers: Arc<Mutex<HashMap<String, String>>>,
}

/// Starts the server in background threads. It runs until the process
/// exits.
pub fn start(routes: Vec<Route>) -> ProbeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes);
    let hits: Arc<Mutex<HashMap<(String, String), usize>>> = Arc::default();
    let last_headers: Arc<Mutex<HashMap<String, String>>> = Arc::default();

    let server = ProbeServer {
        base: format!("http://127.0.0.1:{}", port),
        hits: Arc::clone(&hits),
        last_headers: Arc::clone(&last_headers),
    };

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&hits);
            let last_headers = Arc::clone(&last_headers);
            thread::spawn(move || handle(stream, &routes, &hits, &last_headers));
        }
    });

    server
}

impl ProbeServer {
    /// Absolute URL for a path (e.g. `server.url("/asset")`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// The server's origin with a trailing slash, as a probe's Referer
    /// should send it.
    pub fn origin(&self) -> String {
        format!("{}/", self.base)
    }

    /// How many times `method` was requested for `path`.
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// A header (lowercased name) from the most recent request.
    pub fn request_header(&self, name: &str) -> Option<String> {
        self.last_headers
            .lock()
            .unwrap()
            .get(&name.to_ascii_lowercase())
            .cloned()
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &[Route],
    hits: &Mutex<HashMap<(String, String), usize>>,
    last_headers: &Mutex<HashMap<String, String>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, path, headers) = parse_request(request);

    *hits
        .lock()
        .unwrap()
        .entry((method.to_string(), path.to_string()))
        .or_insert(0) += 1;
    *last_headers.lock().unwrap() = headers;

    let script = match routes.iter().find(|r| r.path == path) {
        Some(route) if method.eq_ignore_ascii_case("HEAD") => &route.head,
        Some(route) if method.eq_ignore_ascii_case("GET") => &route.get,
        Some(_) => {
            let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\n\r\n");
            return;
        }
        None => {
            let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
            return;
        }
    };

    if let Some(delay) = script.delay {
        thread::sleep(delay);
    }

    let mut response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\n",
        script.status,
        script.reason,
        script.body.len()
    );
    if let Some(content_type) = script.content_type {
        response.push_str(&format!("Content-Type: {}\r\n", content_type));
    }
    if let Some(location) = &script.location {
        response.push_str(&format!("Location: {}\r\n", location));
    }
    response.push_str("Connection: close\r\n\r\n");

    let _ = stream.write_all(response.as_bytes());
    if method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(&script.body);
    }
}

/// Returns (method, path, request headers with lowercased names).
fn parse_request(request: &str) -> (&str, &str, HashMap<String, String>) {
    let mut lines = request.lines();
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");

    let mut headers = HashMap::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }
    (method, path, headers)
}
