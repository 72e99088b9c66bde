//! Synchronous emulator session.

use std::io::{BufWriter, Write};

use crate::decoder::Decoder;
use crate::describe;
use crate::error::EmulatorError;
use crate::record::CommandRecord;
use crate::reply::PrinterIdentity;

/// Synchronous emulator session.
///
/// Generic over the reply sink `W`. The sink is the transport's return
/// channel to the host, e.g. a notification characteristic or the write
/// half of a socket.
///
/// # Example
///
/// ```ignore
/// use btb36::Session;
///
/// let sink = /* transport return channel */;
/// let mut session = Session::new(sink);
///
/// // Bytes arrive from the transport in arbitrary fragments.
/// let commands = session.receive(&chunk)?;
/// for command in &commands {
///     println!("{command}");
/// }
/// ```
pub struct Session<W: Write> {
    decoder: Decoder,
    sink: BufWriter<W>,
}

impl<W: Write> Session<W> {
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
    pub fn receive(&mut self, chunk: &[u8]) -> Result<Vec<CommandRecord>, EmulatorError> {
        log::trace!("rx chunk: {} bytes", chunk.len());
        let (commands, replies) = self.decoder.feed(chunk);
        for command in &commands {
            log::info!("{command}");
        }
        for bytes in &replies {
            self.sink.write_all(bytes)?;
            self.sink.flush()?;
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
    ///
    /// # Errors
    ///
    /// Returns [`EmulatorError::Io`] if buffered replies cannot be
    /// flushed to the sink.
    pub fn into_inner(self) -> Result<(Decoder, W), EmulatorError> {
        match self.sink.into_inner() {
            Ok(sink) => Ok((self.decoder, sink)),
            Err(err) => Err(EmulatorError::Io(err.into_error())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_writes_replies_to_sink() {
        let mut session = Session::new(Vec::new());
        let commands = session.receive(&[0x10, 0x04, 0x01]).unwrap();
        assert_eq!(commands.len(), 1);
        let (_, sink) = session.into_inner().unwrap();
        assert_eq!(sink, vec![0x16]);
    }

    #[test]
    fn replies_arrive_in_emission_order() {
        let mut session = Session::new(Vec::new());
        session.receive(&[0x1D, 0x49, 0x01, 0x10, 0x04, 0x02]).unwrap();
        let (_, sink) = session.into_inner().unwrap();
        let mut expected = b"BT-B36".to_vec();
        expected.push(0x12);
        assert_eq!(sink, expected);
    }

    #[test]
    fn print_traffic_leaves_sink_empty() {
        let mut session = Session::new(Vec::new());
        let commands = session.receive(b"Hello\n").unwrap();
        assert_eq!(commands.len(), 2);
        let (_, sink) = session.into_inner().unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn fragments_resume_across_receive_calls() {
        let mut session = Session::new(Vec::new());
        assert!(session.receive(&[0x1D, 0x49]).unwrap().is_empty());
        let commands = session.receive(&[0x01]).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].mnemonic, "GS I");
    }
}
