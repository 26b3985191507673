// src/exec/output.rs

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

/// Consume a child output stream line by line, logging each line at debug.
///
/// Always consuming the pipe keeps the OS buffer from filling up and
/// blocking the child. The task ends when the stream closes.
pub fn forward_lines<R>(service: String, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let reader = BufReader::new(reader);
        let mut lines = reader.lines();

        while let Ok(Some(line)) = lines.next_line().await {
            debug!(service = %service, stream, "{}", line);
        }

        debug!(service = %service, stream, "output stream closed");
    });
}
