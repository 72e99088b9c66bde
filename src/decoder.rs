//! Decoder façade.
//!
//! [`Decoder`] binds the state machine to the reply generator: feed it a
//! chunk, get back the completed commands and the reply bytes the
//! emulated printer must send to the host.

use crate::machine::{StateMachine, Step};
use crate::record::CommandRecord;
use crate::reply::{self, EmulatorState, PrinterIdentity};

/// Stateful, fragmentation-tolerant ESC/POS stream decoder.
///
/// A decoder instance owns its parse state and buffer; construct one per
/// stream. Feeding the same bytes in different chunkings produces the
/// same records and replies, only distributed differently across the
/// return values.
///
/// # Example
///
/// ```
/// use btb36::Decoder;
///
/// let mut decoder = Decoder::new();
/// let (commands, replies) = decoder.feed(&[0x1B, 0x40, 0x10, 0x04, 0x01]);
/// assert_eq!(commands[0].mnemonic, "ESC @");
/// assert_eq!(commands[1].mnemonic, "DLE EOT");
/// assert_eq!(replies, vec![vec![0x16]]);
/// ```
#[derive(Debug, Default)]
pub struct Decoder {
    machine: StateMachine,
    state: EmulatorState,
}

impl Decoder {
    /// Create a decoder with the default BT-B36 identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder reporting the given identity.
    pub fn with_identity(identity: PrinterIdentity) -> Self {
        Self {
            machine: StateMachine::default(),
            state: EmulatorState {
                identity,
                ..EmulatorState::default()
            },
        }
    }

    /// Feed one input chunk.
    ///
    /// The chunk is appended to the internal buffer and the state machine
    /// runs until it needs more bytes. Returns every command completed
    /// and every reply produced during this call, both in stream order.
    ///
    /// `feed` has no error conditions: malformed input becomes an
    /// "unknown" command record and parsing continues.
    pub fn feed(&mut self, chunk: &[u8]) -> (Vec<CommandRecord>, Vec<Vec<u8>>) {
        self.machine.extend(chunk);
        let mut commands = Vec::new();
        let mut replies = Vec::new();
        loop {
            match self.machine.step() {
                Step::Emit(record) => {
                    if let Some(bytes) = reply::reply_for(&record, &mut self.state) {
                        replies.push(bytes);
                    }
                    commands.push(record);
                }
                Step::Continue => {}
                Step::Stall => break,
            }
        }
        (commands, replies)
    }

    /// The emulator state consulted by the reply generator.
    pub fn state(&self) -> &EmulatorState {
        &self.state
    }

    /// Mutable access to the emulator state, e.g. to simulate paper-out.
    pub fn state_mut(&mut self) -> &mut EmulatorState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_feed_is_a_no_op() {
        let mut decoder = Decoder::new();
        let (commands, replies) = decoder.feed(&[]);
        assert!(commands.is_empty());
        assert!(replies.is_empty());
    }

    #[test]
    fn feed_returns_commands_and_replies_in_order() {
        let mut decoder = Decoder::new();
        let (commands, replies) = decoder.feed(&[0x10, 0x04, 0x01, 0x1D, 0x49, 0x01]);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].mnemonic, "DLE EOT");
        assert_eq!(commands[1].mnemonic, "GS I");
        assert_eq!(replies, vec![vec![0x16], b"BT-B36".to_vec()]);
    }

    #[test]
    fn gs_a_updates_state_across_feeds() {
        let mut decoder = Decoder::new();
        decoder.feed(&[0x1D, 0x61, 0x0F]);
        assert!(decoder.state().asb_enabled());
        decoder.feed(&[0x1D, 0x61, 0x00]);
        assert!(!decoder.state().asb_enabled());
    }

    #[test]
    fn custom_identity_flows_into_replies() {
        let identity = PrinterIdentity::new("SRP-350", "2.0.1").unwrap();
        let mut decoder = Decoder::with_identity(identity);
        let (_, replies) = decoder.feed(&[0x1D, 0x49, 0x01]);
        assert_eq!(replies, vec![b"SRP-350".to_vec()]);
    }

    #[test]
    fn state_mut_simulates_paper_out() {
        let mut decoder = Decoder::new();
        decoder.state_mut().paper.paper_end = true;
        let (_, replies) = decoder.feed(&[0x10, 0x04, 0x04]);
        assert_eq!(replies, vec![vec![0x12 | 0x60]]);
    }
}
