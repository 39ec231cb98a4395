//! Stdio transport — one persistent peer over stdin/stdout for the process
//! lifetime.
//!
//! Requests are newline-delimited JSON-RPC messages; responses are written
//! in the order received, one at a time. Logging goes to stderr so stdout
//! stays protocol-clean.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::dispatch::Dispatcher;
use crate::rpc::Response;
use crate::transport::handle_message;
use crate::types::{Error, Result};

/// Serve the single stdio peer until clean EOF on stdin.
pub async fn serve(dispatcher: Arc<Dispatcher>) -> Result<()> {
    tracing::info!("stdio transport serving");
    serve_io(&dispatcher, tokio::io::stdin(), tokio::io::stdout()).await?;
    tracing::info!("stdin closed, stdio transport shutting down");
    Ok(())
}

/// The serve loop over arbitrary reader/writer halves.
///
/// Strictly sequential: the next request is not read until the previous
/// response has been written and flushed. Undecodable input lines are
/// answered at the boundary and never terminate the loop; only clean EOF
/// ends it. Genuine pipe failures still propagate.
async fn serve_io<R, W>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            // clean EOF
            Ok(None) => break,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                let err = Error::transport_decode(e.to_string());
                tracing::debug!(error = %err, "rejecting undecodable input line");
                let response =
                    Response::error(serde_json::Value::Null, err.rpc_code(), err.to_string());
                write_response(&mut writer, &response).await?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(response) = handle_message(dispatcher, line).await else {
            continue;
        };
        write_response(&mut writer, &response).await?;
    }

    Ok(())
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Response) -> Result<()> {
    let encoded = serde_json::to_string(response)?;
    writer.write_all(encoded.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
