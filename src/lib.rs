//! BT-B36 thermal printer emulator core for Rust.
//!
//! This crate provides the transport-agnostic decoding core for emulating
//! BT-B36 (and compatible) thermal receipt printers: an incremental
//! ESC/POS command stream decoder paired with a status-reply generator.
//! Bytes go in, parsed commands and the exact reply bytes the printer
//! must send back come out.
//!
//! # Quick Start
//!
//! ```
//! use btb36::Decoder;
//!
//! let mut decoder = Decoder::new();
//!
//! // Transports fragment arbitrarily; feed whatever arrives.
//! let (commands, replies) = decoder.feed(&[0x1B, 0x40]);
//! assert_eq!(commands[0].mnemonic, "ESC @");
//! assert!(replies.is_empty());
//!
//! // A split command resumes on the next chunk.
//! let (commands, _) = decoder.feed(&[0x1B, 0x61]);
//! assert!(commands.is_empty());
//! let (commands, _) = decoder.feed(&[0x01]);
//! assert_eq!(commands[0].params, "n=1 (centre)");
//!
//! // Status queries produce reply bytes for the host.
//! let (_, replies) = decoder.feed(&[0x10, 0x04, 0x01]);
//! assert_eq!(replies, vec![vec![0x16]]);
//! ```
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Opcode layer** (`opcode` module): Static ESC/GS/DLE/FS tables
//! - **Describe layer** (`describe` module): Parameter summaries for logs
//! - **Machine layer** (internal): Fragmentation-tolerant state machine
//! - **Reply layer** (`reply` module): Status replies and emulator state
//! - **Decoder layer** (`decoder` module): The feed façade
//! - **Session layer** (`session` module): Reply sink + logging glue
//!
//! # Features
//!
//! - `async` - Enable the async session interface using tokio
//!
//! # Fragmentation
//!
//! The decoder assumes nothing about chunk boundaries. Feeding a stream
//! one byte at a time produces the same records as feeding it whole; a
//! command split across chunks is held as partial state and completed
//! when the rest arrives. Text runs are emitted once their end is
//! provable, so no chunking can split one record in two.
//!
//! # Replies
//!
//! Query commands are answered from a small emulator state with the
//! BT-B36 identity by default:
//!
//! ```
//! use btb36::Decoder;
//!
//! let mut decoder = Decoder::new();
//! let (_, replies) = decoder.feed(&[0x1D, 0x49, 0x01]);
//! assert_eq!(replies, vec![b"BT-B36".to_vec()]);
//! ```
//!
//! Hosts can mutate the state to simulate device conditions:
//!
//! ```
//! use btb36::Decoder;
//!
//! let mut decoder = Decoder::new();
//! decoder.state_mut().paper.paper_end = true;
//! let (_, replies) = decoder.feed(&[0x10, 0x04, 0x04]);
//! assert_eq!(replies, vec![vec![0x72]]);
//! ```
//!
//! # Sessions
//!
//! [`Session`] (and `AsyncSession` with the `async` feature) wires a
//! decoder to a reply sink and logs one line per command and reply via
//! the `log` facade:
//!
//! ```
//! use btb36::Session;
//!
//! let mut session = Session::new(Vec::new());
//! session.receive(&[0x10, 0x04, 0x01])?;
//! let (_, sink) = session.into_inner()?;
//! assert_eq!(sink, vec![0x16]);
//! # Ok::<(), btb36::EmulatorError>(())
//! ```

#![warn(missing_docs)]

pub mod decoder;
pub mod describe;
pub mod error;
mod machine;
pub mod opcode;
pub mod record;
pub mod reply;
pub mod session;

/// Prelude module for convenient imports.
///
/// ```
/// use btb36::prelude::*;
/// ```
pub mod prelude {
    pub use crate::decoder::Decoder;
    pub use crate::record::CommandRecord;
    pub use crate::reply::{EmulatorState, PrinterIdentity};
    pub use crate::session::Session;

    #[cfg(feature = "async")]
    pub use crate::session::AsyncSession;
}

// Re-export commonly used types at crate root
pub use decoder::Decoder;
pub use error::{EmulatorError, IdentityError};
pub use record::CommandRecord;
pub use reply::{EmulatorState, PrinterIdentity};
pub use session::Session;

#[cfg(feature = "async")]
pub use session::AsyncSession;
