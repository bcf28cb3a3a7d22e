//! Minimal HTTP/1.1 responder
//!
//! Just enough HTTP to answer health checks: read the request line,
//! route on method and path, write a `Connection: close` response.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long a client may take to send its request line
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Path without query string
    pub path: String,
}

impl Request {
    /// Parse the first line of a raw HTTP request
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.lines().next()?.split_whitespace();
        let method = parts.next()?.to_string();
        let target = parts.next()?;
        let path = target.split('?').next().unwrap_or(target).to_string();
        Some(Self { method, path })
    }
}

/// Response to write back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    pub fn ok(content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::empty(404)
    }

    pub fn method_not_allowed() -> Self {
        Self::empty(405)
    }

    pub fn bad_request() -> Self {
        Self::empty(400)
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: String::new(),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n\
             {}",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len(),
            self.body
        )
        .into_bytes()
    }
}

/// A running listener
pub struct ListenerHandle {
    /// Address actually bound (useful with port 0)
    pub local_addr: SocketAddr,
    pub task: JoinHandle<()>,
}

/// Bind `addr` and answer requests with `handler` until shutdown.
///
/// Binding happens before this returns, so a taken port is reported to the
/// caller rather than to the background task.
pub async fn serve<H>(
    name: &'static str,
    addr: SocketAddr,
    handler: H,
    shutdown_rx: watch::Receiver<bool>,
) -> io::Result<ListenerHandle>
where
    H: Fn(&Request) -> Response + Send + Sync + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    info!(listener = name, %local_addr, "HTTP listener started");

    let task = tokio::spawn(accept_loop(name, listener, Arc::new(handler), shutdown_rx));
    Ok(ListenerHandle { local_addr, task })
}

async fn accept_loop<H>(
    name: &'static str,
    listener: TcpListener,
    handler: Arc<H>,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    H: Fn(&Request) -> Response + Send + Sync + 'static,
{
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let handler = handler.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, handler.as_ref()).await {
                                debug!(
                                    listener = name, %peer, error = %e,
                                    "Request handling error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        warn!(listener = name, error = %e, "Failed to accept connection");
                    }
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    info!(listener = name, "HTTP listener stopped");
}

async fn handle_connection<H>(mut stream: TcpStream, handler: &H) -> io::Result<()>
where
    H: Fn(&Request) -> Response,
{
    let mut buffer = [0u8; 1024];
    let read = read_request_line(&mut stream, &mut buffer);
    let n = match tokio::time::timeout(READ_TIMEOUT, read).await {
        Ok(read) => read?,
        Err(_) => return Err(io::Error::new(io::ErrorKind::TimedOut, "request read timed out")),
    };

    if n == 0 {
        return Ok(());
    }

    let raw = String::from_utf8_lossy(&buffer[..n]);
    let response = match Request::parse(&raw) {
        Some(request) => handler(&request),
        None => Response::bad_request(),
    };

    stream.write_all(&response.to_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

/// Read until the request line is complete, the peer stops sending, or
/// `buffer` is full. Returns the number of bytes read.
async fn read_request_line<S>(stream: &mut S, buffer: &mut [u8]) -> io::Result<usize>
where
    S: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buffer.len() {
        let n = stream.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
        if buffer[..filled].windows(2).any(|w| w == b"\r\n") {
            break;
        }
    }
    Ok(filled)
}
