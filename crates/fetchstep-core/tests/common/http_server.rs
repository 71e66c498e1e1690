//! Minimal HTTP/1.1 server for transport tests.
//!
//! Routes by path: `/ok/<name>` serves the body, `/missing` returns 404,
//! `/flaky` fails with 503 on the first request then serves the body,
//! `/short` announces more bytes than it sends and closes.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// Starts a server in a background thread. Returns the base URL without a trailing
/// slash (e.g. "http://127.0.0.1:12345"). The server runs until the process exits.
pub fn start(body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let flaky_hits = Arc::new(AtomicUsize::new(0));
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let flaky_hits = Arc::clone(&flaky_hits);
            thread::spawn(move || handle(stream, &body, &flaky_hits));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], flaky_hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let ok = |stream: &mut std::net::TcpStream| {
        let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n", body.len());
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(body);
    };

    if path.starts_with("/ok") {
        ok(&mut stream);
    } else if path == "/flaky" {
        if flaky_hits.fetch_add(1, Ordering::SeqCst) == 0 {
            let _ = stream.write_all(
                b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        } else {
            ok(&mut stream);
        }
    } else if path == "/short" {
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len() + 100
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(body);
    } else {
        let _ = stream.write_all(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
        );
    }
    let _ = stream.flush();
}
