//! Accepted-connection handling.
//!
//! One request line in, one CRLF-terminated reply out, then close. A second
//! line on the same connection is never read. The handler is constructed with
//! an explicit resolver reference; nothing is recovered from the transport
//! layer.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::debug;

use identd_core::error::{Error, Result};

use crate::resolver::Resolver;

/// Serve one accepted ident connection.
///
/// `registered` mirrors the registry size: a connection racing the final
/// unregister is dropped without reading, matching the rule that the
/// responder only answers while at least one owner is actively registered.
pub(crate) async fn serve_connection(
    mut stream: TcpStream,
    resolver: Arc<Resolver>,
    registered: watch::Receiver<usize>,
    read_timeout: Duration,
    max_line: usize,
) -> Result<()> {
    let peer = stream.peer_addr()?;
    let local = stream.local_addr()?;
    debug!(peer = %peer, local = %local, "Ident connection");

    if *registered.borrow() == 0 {
        debug!(peer = %peer, "No registered owners, dropping connection");
        return Ok(());
    }

    let (rd, mut wr) = stream.split();
    let line = match timeout(read_timeout, read_request_line(rd, max_line)).await {
        Err(_) => {
            debug!(peer = %peer, "Request line read timed out");
            return Err(Error::ReadTimeout);
        }
        Ok(Ok(None)) => {
            debug!(peer = %peer, "Peer closed before sending a request");
            return Ok(());
        }
        Ok(Ok(Some(line))) => line,
        Ok(Err(e)) => return Err(e.into()),
    };

    // No lock is held here: resolution takes its owner snapshot internally,
    // the reply write happens after it returns.
    let reply = resolver.resolve(&line, local.ip(), peer.ip());

    wr.write_all(reply.as_bytes()).await?;
    wr.write_all(b"\r\n").await?;
    wr.flush().await?;
    wr.shutdown().await?;

    Ok(())
}

/// Read one line, capped at `max_line` bytes.
///
/// Returns `None` on EOF before any byte. EOF after partial data (or hitting
/// the cap) treats what arrived as the request line, best effort.
async fn read_request_line<R: AsyncRead + Unpin>(
    rd: R,
    max_line: usize,
) -> std::io::Result<Option<String>> {
    let mut reader = BufReader::new(rd.take(max_line as u64));
    let mut buf = Vec::with_capacity(32);

    let n = reader.read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
