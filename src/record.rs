//! Parsed command records.

use std::fmt;

/// A fully parsed command extracted from the input stream.
///
/// `raw` holds the exact bytes that produced the record, in stream order.
/// Concatenating the `raw` fields of every record a decoder emits
/// reproduces the consumed prefix of the input stream byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    /// Wall-clock capture time with millisecond precision.
    pub timestamp: String,
    /// Short symbolic name, e.g. `"ESC @"`, `"GS v 0"`, `"TEXT"`.
    pub mnemonic: String,
    /// Human description of the command. Empty for `TEXT` records.
    pub name: String,
    /// Human-readable parameter summary. Possibly empty.
    pub params: String,
    /// The exact byte sequence that produced this record.
    pub raw: Vec<u8>,
}

impl CommandRecord {
    pub(crate) fn new(
        mnemonic: impl Into<String>,
        name: impl Into<String>,
        params: impl Into<String>,
        raw: Vec<u8>,
    ) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%H:%M:%S%.3f").to_string(),
            mnemonic: mnemonic.into(),
            name: name.into(),
            params: params.into(),
            raw,
        }
    }
}

impl fmt::Display for CommandRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:<8}", self.timestamp, self.mnemonic)?;
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        if !self.params.is_empty() {
            write!(f, " | {}", self.params)?;
        }
        Ok(())
    }
}
