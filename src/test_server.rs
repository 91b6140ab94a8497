//! A throwaway HTTP/1.1 server for exercising the API clients in tests.
//! Serves canned responses by method and path and records what it was sent.

use std::{collections::HashMap,
          sync::{Arc, Mutex}};

use tokio::{io::{AsyncReadExt, AsyncWriteExt},
            net::{TcpListener, TcpStream}};

#[derive(Debug, Clone)]
pub struct Request {
  pub method:  String,
  /// Path including the query string.
  pub path:    String,
  /// Keys are lowercased.
  pub headers: HashMap<String, String>,
  pub body:    String,
}

pub struct Server {
  pub base_url: String,
  requests:     Arc<Mutex<Vec<Request>>>,
}

impl Server {
  pub fn requests(&self) -> Vec<Request> {
    self.requests.lock().unwrap().clone()
  }
}

/// `(method, path without query, status, body)`; anything else is a 404.
pub type Route = (&'static str, &'static str, u16, String);

pub async fn serve(routes: Vec<Route>) -> Server {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let base_url = format!("http://{}", listener.local_addr().unwrap());
  let requests = Arc::new(Mutex::new(vec![]));
  let log = requests.clone();

  tokio::spawn(async move {
    while let Ok((mut sock, _)) = listener.accept().await {
      let req = read_request(&mut sock).await;
      let path = req.path.split('?').next().unwrap_or("").to_string();

      let (status, body) = routes.iter()
                                 .find(|(m, p, _, _)| *m == req.method && *p == path)
                                 .map(|(_, _, s, b)| (*s, b.clone()))
                                 .unwrap_or((404, "{}".into()));

      log.lock().unwrap().push(req);

      let resp = format!("HTTP/1.1 {} TEST\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                         status,
                         body.len(),
                         body);
      let _ = sock.write_all(resp.as_bytes()).await;
      let _ = sock.shutdown().await;
    }
  });

  Server { base_url, requests }
}

async fn read_request(sock: &mut TcpStream) -> Request {
  let mut buf = Vec::new();
  let mut chunk = [0u8; 1024];

  let head_len = loop {
    if let Some(i) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
      break i + 4;
    }
    match sock.read(&mut chunk).await {
      | Ok(0) | Err(_) => break buf.len(),
      | Ok(n) => buf.extend_from_slice(&chunk[..n]),
    }
  };

  let head = String::from_utf8_lossy(&buf[..head_len]).to_string();
  let mut lines = head.split("\r\n");
  let mut start = lines.next().unwrap_or("").split(' ');
  let method = start.next().unwrap_or("").to_string();
  let path = start.next().unwrap_or("").to_string();

  let headers = lines.filter_map(|l| l.split_once(':'))
                     .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
                     .collect::<HashMap<_, _>>();

  let body_len = headers.get("content-length")
                        .and_then(|n| n.parse::<usize>().ok())
                        .unwrap_or(0);

  while buf.len() < head_len + body_len {
    match sock.read(&mut chunk).await {
      | Ok(0) | Err(_) => break,
      | Ok(n) => buf.extend_from_slice(&chunk[..n]),
    }
  }

  let body = String::from_utf8_lossy(&buf[head_len..]).to_string();

  Request { method,
            path,
            headers,
            body }
}
