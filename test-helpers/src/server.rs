//! One-shot HTTP server for exercising [`fetcher::HttpTransport`] against a
//! real socket.

use std::io;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct StubServer {
    /// `http://127.0.0.1:<port>/`
    pub url: String,
    /// Head lines (request line and headers) of the one request served.
    pub request_head: JoinHandle<io::Result<Vec<String>>>,
}

/// Serve a single request with `200 OK` and `body` on an OS-assigned port.
pub async fn spawn_stub_server(body: Value) -> io::Result<StubServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}/", listener.local_addr()?);
    let body = body.to_string();

    let request_head = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await?;
        let head = read_request(&mut stream).await?;
        let response = format!(
            "HTTP/1.1 200 OK\r\n\
             content-type: application/json\r\n\
             content-length: {}\r\n\
             connection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await?;
        Ok(head)
    });

    Ok(StubServer { url, request_head })
}

/// Read the request head and drain its body.
async fn read_request(stream: &mut TcpStream) -> io::Result<Vec<String>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break end;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head: Vec<String> = String::from_utf8_lossy(&buf[..head_end])
        .lines()
        .map(str::to_string)
        .collect();
    let content_length = head
        .iter()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut remaining =
        (head_end + 4 + content_length).saturating_sub(buf.len());
    while remaining > 0 {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        remaining = remaining.saturating_sub(n);
    }

    Ok(head)
}
