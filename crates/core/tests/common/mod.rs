//! Loopback HTTP fixture server for integration tests.
#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread;

pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self { status: 200, content_type, body: body.into() }
    }

    pub fn status(status: u16) -> Self {
        Self { status, content_type: "text/plain", body: format!("status {}", status).into_bytes() }
    }
}

/// A request as seen by the server: path plus the lowercased header block.
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: String,
    pub head: String,
}

pub struct FixtureServer {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl FixtureServer {
    /// Serves `handler` on 127.0.0.1, one connection at a time.
    pub fn start(handler: impl Fn(&str) -> Reply + Send + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };

                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&buf).to_lowercase();
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                log.lock().unwrap().push(Seen { path: path.clone(), head });

                let reply = handler(&path);
                let header = format!(
                    "HTTP/1.1 {} Fixture\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    reply.status,
                    reply.content_type,
                    reply.body.len()
                );
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(&reply.body);
                let _ = stream.flush();
            }
        });

        Self { addr, seen }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.seen().iter().filter(|s| s.path == path).count()
    }
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/{}", name)).unwrap()
}

pub const THREAD_PATH: &str = "/foro/off/hilo-gatos-123";

/// Serves the two-page thread fixture and its assets.
pub fn thread_server() -> FixtureServer {
    let page_1 = fixture("thread/page_1.html");
    let page_2 = fixture("thread/page_2.html");
    let css = fixture("thread/main.css");

    FixtureServer::start(move |path| match path {
        "/foro/off/hilo-gatos-123" => Reply::ok("text/html; charset=utf-8", page_1.clone()),
        "/foro/off/hilo-gatos-123/2" => Reply::ok("text/html; charset=utf-8", page_2.clone()),
        "/css/main.css" => Reply::ok("text/css", css.clone()),
        "/media/cat.jpg" => Reply::ok("image/jpeg", b"\xff\xd8\xff\xe0cat".to_vec()),
        "/img/users/avatar/u1.jpg" => Reply::ok("image/jpeg", b"\xff\xd8\xff\xe0u1".to_vec()),
        "/img/users/avatar/u2.jpg" => Reply::ok("image/jpeg", b"\xff\xd8\xff\xe0u2".to_vec()),
        _ => Reply::status(404),
    })
}
