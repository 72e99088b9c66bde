//! Emulator session glue.
//!
//! A session binds a [`Decoder`](crate::Decoder) to a reply sink and the
//! `log` facade: each received chunk is decoded, every command and reply
//! is logged as one line, and reply bytes are written to the sink in
//! emission order. The decoder itself stays pure; the session is the
//! subscriber.

mod sync;

pub use sync::Session;

#[cfg(feature = "async")]
mod r#async;

#[cfg(feature = "async")]
pub use r#async::AsyncSession;
