//! Minimal HTTP/1.1 server standing in for watch pages in integration tests.
//!
//! Serves `GET /watch?v=<id>` from a fixed table of page bodies. Unknown ids
//! get 404. The first `throttle_first` requests get 503 so retry can be
//! exercised. `/moved?v=<id>` answers with a 302 to the watch path.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Default)]
pub struct WatchServerOptions {
    /// Number of leading requests answered with 503 Service Unavailable.
    pub throttle_first: usize,
}

pub struct WatchServer {
    /// Origin, e.g. "http://127.0.0.1:12345".
    pub origin: String,
    hits: Arc<AtomicUsize>,
}

impl WatchServer {
    /// Prefix to which a video id is appended.
    pub fn watch_url_base(&self) -> String {
        format!("{}/watch?v=", self.origin)
    }

    /// Requests seen so far, including throttled ones.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Page body in the shape the host serves: player response JSON in a script.
pub fn watch_page(description: &str) -> String {
    let json = serde_json::json!({ "videoDetails": { "shortDescription": description } });
    format!(
        "<!doctype html><html><head><title>video</title></head><body>\
         <script>var ytInitialPlayerResponse = {json};var meta = {{}};</script>\
         </body></html>"
    )
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start(pages: &[(&str, String)]) -> WatchServer {
    start_with_options(pages, WatchServerOptions::default())
}

pub fn start_with_options(pages: &[(&str, String)], opts: WatchServerOptions) -> WatchServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let pages: Arc<HashMap<String, String>> = Arc::new(
        pages
            .iter()
            .map(|(id, body)| (id.to_string(), body.clone()))
            .collect(),
    );
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let pages = Arc::clone(&pages);
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let throttled = n < opts.throttle_first;
            thread::spawn(move || handle(stream, &pages, throttled));
        }
    });
    WatchServer {
        origin: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(mut stream: std::net::TcpStream, pages: &HashMap<String, String>, throttled: bool) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
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
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");
    let (path, id) = match target.split_once("?v=") {
        Some((path, id)) => (path, id),
        None => (target, ""),
    };

    let response = if throttled {
        status_only("503 Service Unavailable")
    } else if path == "/moved" {
        format!(
            "HTTP/1.1 302 Found\r\nLocation: /watch?v={}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            id
        )
    } else if path != "/watch" {
        status_only("404 Not Found")
    } else {
        match pages.get(id) {
            Some(body) => format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            ),
            None => status_only("404 Not Found"),
        }
    };
    let _ = stream.write_all(response.as_bytes());
}

fn status_only(status: &str) -> String {
    format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status)
}
