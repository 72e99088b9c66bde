//! Status replies and emulator-side printer state.
//!
//! Query commands in the decoded stream (`DLE EOT`, `GS I`, `GS r`,
//! `ESC v`) are answered from a small emulator state: the printer's
//! identity strings and four status-byte models. Everything else flows
//! host-to-printer only and produces no reply.

use crate::error::IdentityError;
use crate::record::CommandRecord;

/// Printer identity reported by `GS I`.
///
/// The model and firmware strings are sent on the wire as raw ASCII with
/// no terminator, so construction validates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterIdentity {
    model: String,
    type_id: u8,
    firmware: String,
}

impl Default for PrinterIdentity {
    fn default() -> Self {
        Self {
            model: "BT-B36".to_string(),
            type_id: 0x02,
            firmware: "0.1.3".to_string(),
        }
    }
}

impl PrinterIdentity {
    /// Create an identity with the default type byte.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if either string contains a character
    /// that is not printable ASCII.
    pub fn new(model: impl Into<String>, firmware: impl Into<String>) -> Result<Self, IdentityError> {
        let model = validated(model.into())?;
        let firmware = validated(firmware.into())?;
        Ok(Self {
            model,
            type_id: 0x02,
            firmware,
        })
    }

    /// Set the type byte returned for `GS I` n=2.
    #[must_use]
    pub fn with_type_id(mut self, type_id: u8) -> Self {
        self.type_id = type_id;
        self
    }

    /// Model string returned for `GS I` n=1.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Type byte returned for `GS I` n=2.
    pub fn type_id(&self) -> u8 {
        self.type_id
    }

    /// Firmware string returned for `GS I` n=3.
    pub fn firmware(&self) -> &str {
        &self.firmware
    }
}

fn validated(value: String) -> Result<String, IdentityError> {
    match value.char_indices().find(|(_, c)| !c.is_ascii() || c.is_ascii_control()) {
        None => Ok(value),
        Some((offset, bad)) => Err(IdentityError {
            span: (offset, bad.len_utf8()).into(),
            src: value,
            help: Some("identity strings are sent as raw unterminated ASCII".to_string()),
        }),
    }
}

/// Printer status reported for `DLE EOT` n=1.
///
/// Bits 1 and 4 of the wire byte are fixed to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterStatus {
    /// Drawer kick-out connector pin 3 is high.
    pub drawer_pin_high: bool,
    /// Printer is online.
    pub online: bool,
    /// Paper feed switch is being pressed.
    pub feed_button_pressed: bool,
    /// Paper is present (not at end).
    pub paper_present: bool,
}

impl Default for PrinterStatus {
    fn default() -> Self {
        Self {
            drawer_pin_high: true,
            online: true,
            feed_button_pressed: false,
            paper_present: true,
        }
    }
}

impl PrinterStatus {
    fn encode(self) -> u8 {
        let mut byte = 0x12;
        if self.drawer_pin_high {
            byte |= 0x04;
        }
        if !self.online {
            byte |= 0x08;
        }
        if self.feed_button_pressed {
            byte |= 0x20;
        }
        if !self.paper_present {
            byte |= 0x60;
        }
        byte
    }
}

/// Offline status reported for `DLE EOT` n=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OfflineStatus {
    /// Cover is open.
    pub cover_open: bool,
    /// Paper is being fed by the feed button.
    pub paper_feeding: bool,
    /// Recoverable error occurred.
    pub recoverable_error: bool,
    /// Auto-cutter error occurred.
    pub cutter_error: bool,
}

impl OfflineStatus {
    fn encode(self) -> u8 {
        let mut byte = 0x12;
        if self.cover_open {
            byte |= 0x04;
        }
        if self.paper_feeding {
            byte |= 0x08;
        }
        if self.recoverable_error {
            byte |= 0x20;
        }
        if self.cutter_error {
            byte |= 0x40;
        }
        byte
    }
}

/// Error status reported for `DLE EOT` n=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorStatus {
    /// Recoverable error occurred.
    pub recoverable_error: bool,
    /// Auto-cutter error occurred.
    pub cutter_error: bool,
    /// Unrecoverable error occurred.
    pub unrecoverable_error: bool,
}

impl ErrorStatus {
    fn encode(self) -> u8 {
        let mut byte = 0x12;
        if self.recoverable_error {
            byte |= 0x04;
        }
        if self.cutter_error {
            byte |= 0x08;
        }
        if self.unrecoverable_error {
            byte |= 0x20;
        }
        byte
    }
}

/// Paper roll sensor status reported for `DLE EOT` n=4 and, in its
/// sensor-byte form, for `ESC v` and `GS r` n=1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaperRollStatus {
    /// Paper near end detected.
    pub paper_near_end: bool,
    /// Paper end detected.
    pub paper_end: bool,
}

impl PaperRollStatus {
    fn encode(self) -> u8 {
        let mut byte = 0x12;
        if self.paper_near_end {
            byte |= 0x0C;
        }
        if self.paper_end {
            byte |= 0x60;
        }
        byte
    }

    /// Sensor byte for `ESC v` and `GS r` n=1: bits 0-1 near end,
    /// bits 2-3 end.
    fn sensor_byte(self) -> u8 {
        let mut byte = 0x00;
        if self.paper_near_end {
            byte |= 0x03;
        }
        if self.paper_end {
            byte |= 0x0C;
        }
        byte
    }
}

/// Mutable emulator state consulted by the reply generator.
///
/// Hosts can mutate the status models between `feed` calls to simulate
/// conditions such as paper-out or an open cover.
#[derive(Debug, Clone, Default)]
pub struct EmulatorState {
    /// Identity reported by `GS I`.
    pub identity: PrinterIdentity,
    /// The last value written by `GS a n`. Zero disables ASB.
    pub asb_mode: u8,
    /// Printer status for `DLE EOT` n=1.
    pub printer: PrinterStatus,
    /// Offline status for `DLE EOT` n=2.
    pub offline: OfflineStatus,
    /// Error status for `DLE EOT` n=3.
    pub errors: ErrorStatus,
    /// Paper roll sensor status for `DLE EOT` n=4, `ESC v`, `GS r`.
    pub paper: PaperRollStatus,
}

impl EmulatorState {
    /// Whether automatic status back is currently enabled.
    pub fn asb_enabled(&self) -> bool {
        self.asb_mode != 0
    }
}

/// Produce the reply bytes for a parsed command, if any.
///
/// `GS a` stores its parameter in `state` and produces no reply. Query
/// commands with an out-of-range parameter produce no reply either; the
/// real device stays silent on those.
pub fn reply_for(record: &CommandRecord, state: &mut EmulatorState) -> Option<Vec<u8>> {
    let param = |index: usize| record.raw.get(index).copied();
    match record.mnemonic.as_str() {
        "DLE EOT" => {
            let byte = match param(2)? {
                1 => state.printer.encode(),
                2 => state.offline.encode(),
                3 => state.errors.encode(),
                4 => state.paper.encode(),
                _ => return None,
            };
            Some(vec![byte])
        }
        "GS I" => match param(2)? {
            1 => Some(state.identity.model().as_bytes().to_vec()),
            2 => Some(vec![state.identity.type_id()]),
            3 => Some(state.identity.firmware().as_bytes().to_vec()),
            _ => None,
        },
        "GS r" => match param(2)? {
            1 | 49 => Some(vec![state.paper.sensor_byte()]),
            2 | 50 => Some(vec![0x00]),
            _ => None,
        },
        "GS a" => {
            state.asb_mode = param(2)?;
            None
        }
        "ESC v" => Some(vec![state.paper.sensor_byte()]),
        _ => None,
    }
}
