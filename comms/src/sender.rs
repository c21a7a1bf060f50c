//! The writing half of a framed link.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{LenType, Serialize};

/// Writes length-prefixed frames.
///
/// A frame is the big-endian length, the owned head of the message and, for
/// count tables and error texts, the borrowed tail written straight from the
/// caller's memory.
pub struct OnoSender<W>
where
    W: AsyncWrite + Unpin,
{
    tx: W,
    head: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> OnoSender<W> {
    /// Creates a new `OnoSender` instance.
    ///
    /// # Arguments
    /// * `tx` - The underlying writer.
    pub(super) fn new(tx: W) -> Self {
        Self {
            tx,
            head: Vec::new(),
        }
    }

    /// Writes `msg` as one frame and flushes the writer.
    ///
    /// # Errors
    /// Fails with `InvalidInput` if the frame does not fit the length prefix, or
    /// with whatever the writer reports.
    pub async fn send<'a, T: Serialize<'a>>(&mut self, msg: &'a T) -> io::Result<()> {
        self.head.clear();
        let tail = msg.serialize(&mut self.head);
        let frame_len = self.head.len() + tail.map_or(0, <[u8]>::len);

        let prefix = LenType::try_from(frame_len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))?;

        self.tx.write_all(&prefix.to_be_bytes()).await?;
        self.tx.write_all(&self.head).await?;

        if let Some(tail) = tail {
            self.tx.write_all(tail).await?;
        }

        self.tx.flush().await
    }
}
