//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves one static body for every GET path and counts requests so tests
//! can tell whether a download actually happened. The first few requests
//! can be made to fail to exercise the retry path.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Status line code for GET once the failure modes below are used up;
    /// anything but 200 sends no body.
    pub status: u16,
    /// Answer this many initial GETs with 503 and no body.
    pub fail_first: usize,
    /// After those, this many GETs advertise the full length but close
    /// the connection after half the body.
    pub truncate_first: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            fail_first: 0,
            truncate_first: 0,
        }
    }
}

pub struct TestServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Number of GET requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body`. The server runs until the process exits.
pub fn start(body: Vec<u8>) -> TestServer {
    start_with_options(body, ServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: ServerOptions) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let hits = Arc::clone(&hits_srv);
            thread::spawn(move || handle(stream, &body, opts, &hits));
        }
    });
    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Read until the end of the request head (blank line), EOF or a full buffer.
fn read_request_head(stream: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") && head.len() < 64 * 1024 {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    if head.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&head).into_owned())
    }
}

fn handle(mut stream: TcpStream, body: &[u8], opts: ServerOptions, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request_head(&mut stream) else {
        return;
    };
    let method = request.split_whitespace().next().unwrap_or("");
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    let n = hits.fetch_add(1, Ordering::SeqCst);

    let (status, payload, advertised): (u16, &[u8], usize) = if n < opts.fail_first {
        (503, &[], 0)
    } else if n < opts.fail_first + opts.truncate_first {
        (200, &body[..body.len() / 2], body.len())
    } else if opts.status == 200 {
        (200, body, body.len())
    } else {
        (opts.status, &[], 0)
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/gzip\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        advertised
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(payload);
}
