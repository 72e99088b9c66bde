//! Asynchronous emulator session.
//!
//! Requires the `async` feature.

use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::decoder::Decoder;
use crate::describe;
use crate::error::EmulatorError;
use crate::record::CommandRecord;
use crate::reply::PrinterIdentity;

/// Asynchronous emulator session.
///
/// Generic over the reply sink `W`. Decoding itself is synchronous and
/// never blocks; only delivering reply bytes to the sink awaits.
///
/// # Example
///
/// ```ignore
/// use btb36::AsyncSession;
///
/// let sink = /* async transport return channel */;
/// let mut session = AsyncSession::new(sink);
/// let commands = session.receive(&chunk).await?;
/// ```
pub struct AsyncSession<W: AsyncWrite + Unpin> {
    decoder: Decoder,
    sink: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> AsyncSession<W> {
    /// Create a session with the default BT-B36 identity.
    pub fn new(sink: W) -> Self {
        Self::with_decoder(Decoder::new(), sink)
    }

    /// Create a session reporting the given identity.
    pub fn with_identity(identity: PrinterIdentity, sink: W) -> Self {
        Self::with_decoder(Decoder::with_identity(identity), sink)
    }

    /// Create a session around an existing decoder.
    pub fn with_decoder(decoder: Decoder, sink: W) -> Self {
        Self {
            decoder,
            sink: BufWriter::new(sink),
        }
    }

    /// Decode one received chunk.
    ///
    /// Logs one line per completed command and per reply, writes each
    /// reply to the sink, and flushes so replies reach the host in
    /// emission order. Returns the completed commands.
    ///
    /// # Errors
    ///
    /// Returns [`EmulatorError::Io`] if the sink rejects a write.
    pub async fn receive(&mut self, chunk: &[u8]) -> Result<Vec<CommandRecord>, EmulatorError> {
        log::trace!("rx chunk: {} bytes", chunk.len());
        let (commands, replies) = self.decoder.feed(chunk);
        for command in &commands {
            log::info!("{command}");
        }
        for bytes in &replies {
            self.sink.write_all(bytes).await?;
            self.sink.flush().await?;
            log::info!("tx reply: {}", describe::hex(bytes));
        }
        Ok(commands)
    }

    /// The wrapped decoder.
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Mutable access to the wrapped decoder.
    pub fn decoder_mut(&mut self) -> &mut Decoder {
        &mut self.decoder
    }

    /// Consume the session and return the decoder and the inner sink.
    pub fn into_inner(self) -> (Decoder, W) {
        (self.decoder, self.sink.into_inner())
    }
}
