//! Incremental ESC/POS state machine.
//!
//! [`StateMachine`] consumes a buffered byte stream and produces completed
//! [`CommandRecord`]s one step at a time. All fragmentation handling lives
//! here: a step either consumes bytes (possibly emitting a record) or
//! reports that it cannot advance until more input arrives, leaving phase
//! and partial state intact so the next chunk resumes cleanly.

use crate::describe;
use crate::opcode::{self, DLE, ESC, FS, GS, Opcode};
use crate::record::CommandRecord;

/// Byte queue with an explicit head cursor.
///
/// Popping from the head is O(1); dead storage is compacted once it
/// outgrows the live tail, keeping large raster payloads linear overall.
#[derive(Debug, Default)]
struct ByteQueue {
    buf: Vec<u8>,
    head: usize,
}

impl ByteQueue {
    fn extend(&mut self, chunk: &[u8]) {
        if self.head > 0 && self.head >= self.buf.len() - self.head {
            self.buf.drain(..self.head);
            self.head = 0;
        }
        self.buf.extend_from_slice(chunk);
    }

    fn live(&self) -> &[u8] {
        &self.buf[self.head..]
    }

    fn len(&self) -> usize {
        self.buf.len() - self.head
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.head).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.buf.get(self.head + offset).copied()
    }

    fn pop(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.head += 1;
        Some(byte)
    }

    /// Move `count` bytes from the head into `out`.
    fn take_into(&mut self, count: usize, out: &mut Vec<u8>) {
        debug_assert!(count <= self.len());
        out.extend_from_slice(&self.buf[self.head..self.head + count]);
        self.head += count;
    }

    /// Offset of the first occurrence of `needle` in the live tail.
    fn find(&self, needle: u8) -> Option<usize> {
        self.live().iter().position(|&b| b == needle)
    }
}

/// Sub-phase for variable-length payloads.
///
/// Each variant carries exactly the scratch its completion step needs;
/// everything else lives in the pending command's raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VarPhase {
    /// `ESC *` waiting for the `(m, nL, nH)` header.
    EscStarHeader,
    /// `ESC *` consuming the remaining column data.
    EscStarData { needed: usize },
    /// `ESC D` consuming tab stops up to and including the NUL.
    EscDTabs,
    /// `GS V` waiting for the cut mode byte.
    GsVMode,
    /// `GS V` mode 65/66 waiting for the feed amount.
    GsVExtra,
    /// `GS v 0` waiting for the `(m, xL, xH, yL, yH)` header.
    GsV0Header,
    /// `GS v 0` consuming raster data.
    GsV0Data { needed: usize },
    /// `GS ( L` waiting for the `(pL, pH)` length.
    GsParenLHeader,
    /// `GS ( L` consuming graphics data.
    GsParenLData { needed: usize },
    /// Other `GS ( <char>` waiting for the `(pL, pH)` length.
    GsParenGenericHeader,
    /// Other `GS ( <char>` consuming data.
    GsParenGenericData { needed: usize },
    /// `GS k` waiting for the symbology byte.
    GsKType,
    /// `GS k` format A consuming NUL-terminated data.
    GsKFormatA,
    /// `GS k` format B waiting for the length byte.
    GsKFormatBLen,
    /// `GS k` format B consuming counted data.
    GsKFormatBData { needed: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Phase {
    #[default]
    Idle,
    /// Accumulating a text run; `scanned` bytes of the buffer are already
    /// known to contain no terminator.
    TextRun {
        scanned: usize,
    },
    EscPrefix,
    GsPrefix,
    DlePrefix,
    FsPrefix,
    FixedParams {
        needed: usize,
    },
    VarParams(VarPhase),
}

/// The partial command being assembled while not `Idle`.
#[derive(Debug, Default)]
struct Pending {
    mnemonic: String,
    name: String,
    raw: Vec<u8>,
    /// Offset into `raw` where parameter bytes begin.
    param_start: usize,
}

/// Outcome of a single state machine step.
pub(crate) enum Step {
    /// A record completed.
    Emit(CommandRecord),
    /// Bytes were consumed without completing a record.
    Continue,
    /// Cannot advance until more input arrives.
    Stall,
}

/// Fragmentation-tolerant ESC/POS parser state.
#[derive(Debug, Default)]
pub(crate) struct StateMachine {
    phase: Phase,
    pending: Pending,
    queue: ByteQueue,
}

impl StateMachine {
    /// Append an input chunk to the buffer.
    pub(crate) fn extend(&mut self, chunk: &[u8]) {
        self.queue.extend(chunk);
    }

    /// Bytes buffered but not yet attributed to an emitted record.
    #[cfg(test)]
    fn unconsumed(&self) -> usize {
        self.pending.raw.len() + self.queue.len()
    }

    /// Advance the machine by one step.
    pub(crate) fn step(&mut self) -> Step {
        match self.phase {
            Phase::Idle => self.step_idle(),
            Phase::TextRun { scanned } => self.step_text(scanned),
            Phase::EscPrefix => self.step_esc_prefix(),
            Phase::GsPrefix => self.step_gs_prefix(),
            Phase::DlePrefix => self.step_lookup_prefix("DLE", opcode::dle),
            Phase::FsPrefix => self.step_lookup_prefix("FS", opcode::fs),
            Phase::FixedParams { needed } => self.step_fixed(needed),
            Phase::VarParams(sub) => self.step_var(sub),
        }
    }

    fn step_idle(&mut self) -> Step {
        let Some(byte) = self.queue.peek() else {
            return Step::Stall;
        };
        let prefix = match byte {
            ESC => Some(Phase::EscPrefix),
            GS => Some(Phase::GsPrefix),
            DLE => Some(Phase::DlePrefix),
            FS => Some(Phase::FsPrefix),
            _ => None,
        };
        if let Some(phase) = prefix {
            self.queue.pop();
            self.pending.raw.push(byte);
            self.phase = phase;
            return Step::Continue;
        }
        if let Some(entry) = opcode::control(byte) {
            self.queue.pop();
            return Step::Emit(CommandRecord::new(entry.mnemonic, entry.name, "", vec![byte]));
        }
        self.step_text(0)
    }

    /// Emit a text run. The run ends at the first introducer or control
    /// byte; an unterminated run stays in the buffer so that no chunk
    /// boundary can split one record into two. The scan resumes after the
    /// `scanned` bytes checked before the last stall, so each byte of a
    /// run is examined once no matter how it is chunked.
    fn step_text(&mut self, scanned: usize) -> Step {
        let found = self.queue.live()[scanned..]
            .iter()
            .position(|&b| opcode::is_introducer(b) || opcode::control(b).is_some());
        let Some(found) = found else {
            self.phase = Phase::TextRun {
                scanned: self.queue.len(),
            };
            return Step::Stall;
        };
        let end = scanned + found;
        let mut raw = Vec::with_capacity(end);
        self.queue.take_into(end, &mut raw);
        let text = decode_text(&raw);
        self.phase = Phase::Idle;
        Step::Emit(CommandRecord::new("TEXT", "", format!("\"{text}\""), raw))
    }

    fn step_esc_prefix(&mut self) -> Step {
        let Some(byte) = self.queue.pop() else {
            return Step::Stall;
        };
        self.pending.raw.push(byte);
        match byte {
            0x2A => self.begin_var("ESC *", "select bit image mode", VarPhase::EscStarHeader),
            0x44 => self.begin_var("ESC D", "set horizontal tab positions", VarPhase::EscDTabs),
            _ => self.dispatch("ESC", opcode::esc, byte),
        }
    }

    fn step_gs_prefix(&mut self) -> Step {
        let Some(byte) = self.queue.peek() else {
            return Step::Stall;
        };
        match byte {
            0x56 => {
                self.queue.pop();
                self.pending.raw.push(byte);
                self.begin_var("GS V", "cut paper", VarPhase::GsVMode)
            }
            0x6B => {
                self.queue.pop();
                self.pending.raw.push(byte);
                self.begin_var("GS k", "print barcode", VarPhase::GsKType)
            }
            0x76 => {
                // The second byte decides between raster output and an
                // unknown command, so both are needed before consuming.
                let Some(second) = self.queue.peek_at(1) else {
                    return Step::Stall;
                };
                self.queue.pop();
                self.queue.pop();
                self.pending.raw.push(byte);
                self.pending.raw.push(second);
                if second == 0x30 {
                    self.begin_var("GS v 0", "print raster bit image", VarPhase::GsV0Header)
                } else {
                    self.pending.mnemonic = "GS v".to_string();
                    self.pending.name = "unknown GS v".to_string();
                    self.pending.param_start = self.pending.raw.len();
                    self.emit_pending()
                }
            }
            0x28 => {
                let Some(second) = self.queue.peek_at(1) else {
                    return Step::Stall;
                };
                self.queue.pop();
                self.queue.pop();
                self.pending.raw.push(byte);
                self.pending.raw.push(second);
                if second == 0x4C {
                    self.begin_var("GS ( L", "print graphics data", VarPhase::GsParenLHeader)
                } else {
                    let mnemonic = format!("GS ( {}", second as char);
                    self.pending.mnemonic = mnemonic;
                    self.pending.name = "extended command".to_string();
                    self.pending.param_start = self.pending.raw.len();
                    self.phase = Phase::VarParams(VarPhase::GsParenGenericHeader);
                    Step::Continue
                }
            }
            _ => {
                self.queue.pop();
                self.pending.raw.push(byte);
                self.dispatch("GS", opcode::gs, byte)
            }
        }
    }

    fn step_lookup_prefix(&mut self, family: &str, table: fn(u8) -> Option<Opcode>) -> Step {
        let Some(byte) = self.queue.pop() else {
            return Step::Stall;
        };
        self.pending.raw.push(byte);
        self.dispatch(family, table, byte)
    }

    /// Table-driven opcode dispatch shared by all four families.
    fn dispatch(&mut self, family: &str, table: fn(u8) -> Option<Opcode>, byte: u8) -> Step {
        self.pending.param_start = self.pending.raw.len();
        match table(byte) {
            Some(entry) => {
                self.pending.mnemonic = entry.mnemonic.to_string();
                self.pending.name = entry.name.to_string();
                if entry.param_len == 0 {
                    self.emit_pending()
                } else {
                    self.phase = Phase::FixedParams {
                        needed: entry.param_len,
                    };
                    Step::Continue
                }
            }
            None => {
                self.pending.mnemonic = format!("{family} 0x{byte:02X}");
                self.pending.name = format!("unknown {family} command");
                self.emit_pending()
            }
        }
    }

    fn step_fixed(&mut self, needed: usize) -> Step {
        if needed == 0 {
            // Unreachable with the current tables; recover rather than spin.
            log::warn!("empty fixed-parameter phase for {}", self.pending.mnemonic);
            return self.reset();
        }
        if self.queue.len() < needed {
            return Step::Stall;
        }
        self.queue.take_into(needed, &mut self.pending.raw);
        self.emit_pending()
    }

    fn step_var(&mut self, sub: VarPhase) -> Step {
        match sub {
            VarPhase::EscStarHeader => {
                if self.queue.len() < 3 {
                    return Step::Stall;
                }
                self.queue.take_into(3, &mut self.pending.raw);
                let header = &self.pending.raw[self.pending.param_start..];
                let mode = header[0];
                let columns = usize::from(header[1]) + 256 * usize::from(header[2]);
                let needed = match mode {
                    0 | 1 => columns,
                    32 | 33 => 3 * columns,
                    _ => columns,
                };
                self.begin_data(needed, |needed| VarPhase::EscStarData {
                    needed,
                })
            }
            VarPhase::EscStarData { needed } => {
                self.drain_data(needed, |needed| VarPhase::EscStarData {
                    needed,
                })
            }
            VarPhase::EscDTabs | VarPhase::GsKFormatA => self.drain_until_nul(),
            VarPhase::GsVMode => {
                let Some(mode) = self.queue.pop() else {
                    return Step::Stall;
                };
                self.pending.raw.push(mode);
                if mode == 65 || mode == 66 {
                    self.phase = Phase::VarParams(VarPhase::GsVExtra);
                    Step::Continue
                } else {
                    self.emit_pending()
                }
            }
            VarPhase::GsVExtra => {
                let Some(amount) = self.queue.pop() else {
                    return Step::Stall;
                };
                self.pending.raw.push(amount);
                self.emit_pending()
            }
            VarPhase::GsV0Header => {
                if self.queue.len() < 5 {
                    return Step::Stall;
                }
                self.queue.take_into(5, &mut self.pending.raw);
                let header = &self.pending.raw[self.pending.param_start..];
                let width = usize::from(header[1]) + 256 * usize::from(header[2]);
                let height = usize::from(header[3]) + 256 * usize::from(header[4]);
                self.begin_data(width * height, |needed| VarPhase::GsV0Data {
                    needed,
                })
            }
            VarPhase::GsV0Data { needed } => {
                self.drain_data(needed, |needed| VarPhase::GsV0Data {
                    needed,
                })
            }
            VarPhase::GsParenLHeader => self.step_paren_header(|needed| VarPhase::GsParenLData {
                needed,
            }),
            VarPhase::GsParenLData { needed } => {
                self.drain_data(needed, |needed| VarPhase::GsParenLData {
                    needed,
                })
            }
            VarPhase::GsParenGenericHeader => {
                self.step_paren_header(|needed| VarPhase::GsParenGenericData {
                    needed,
                })
            }
            VarPhase::GsParenGenericData { needed } => {
                self.drain_data(needed, |needed| VarPhase::GsParenGenericData {
                    needed,
                })
            }
            VarPhase::GsKType => {
                let Some(kind) = self.queue.pop() else {
                    return Step::Stall;
                };
                self.pending.raw.push(kind);
                if kind <= 6 {
                    self.phase = Phase::VarParams(VarPhase::GsKFormatA);
                } else {
                    self.phase = Phase::VarParams(VarPhase::GsKFormatBLen);
                }
                Step::Continue
            }
            VarPhase::GsKFormatBLen => {
                let Some(length) = self.queue.pop() else {
                    return Step::Stall;
                };
                self.pending.raw.push(length);
                self.begin_data(usize::from(length), |needed| VarPhase::GsKFormatBData {
                    needed,
                })
            }
            VarPhase::GsKFormatBData { needed } => {
                self.drain_data(needed, |needed| VarPhase::GsKFormatBData {
                    needed,
                })
            }
        }
    }

    /// Consume a `(pL, pH)` length header and start its data window.
    fn step_paren_header(&mut self, data_phase: fn(usize) -> VarPhase) -> Step {
        if self.queue.len() < 2 {
            return Step::Stall;
        }
        self.queue.take_into(2, &mut self.pending.raw);
        let raw = &self.pending.raw;
        let low = raw[raw.len() - 2];
        let high = raw[raw.len() - 1];
        self.begin_data(usize::from(low) + 256 * usize::from(high), data_phase)
    }

    /// Enter a data window of `needed` bytes, or emit right away for an
    /// empty window.
    fn begin_data(&mut self, needed: usize, data_phase: fn(usize) -> VarPhase) -> Step {
        if needed == 0 {
            self.emit_pending()
        } else {
            self.phase = Phase::VarParams(data_phase(needed));
            Step::Continue
        }
    }

    /// Absorb as much of a data window as the buffer allows. Bytes inside
    /// the window are raw payload; no opcode parsing happens here.
    fn drain_data(&mut self, needed: usize, data_phase: fn(usize) -> VarPhase) -> Step {
        let take = needed.min(self.queue.len());
        self.queue.take_into(take, &mut self.pending.raw);
        let left = needed - take;
        if left == 0 {
            self.emit_pending()
        } else {
            self.phase = Phase::VarParams(data_phase(left));
            Step::Stall
        }
    }

    /// Consume bytes up to and including a NUL terminator.
    fn drain_until_nul(&mut self) -> Step {
        match self.queue.find(0x00) {
            Some(offset) => {
                self.queue.take_into(offset + 1, &mut self.pending.raw);
                self.emit_pending()
            }
            None => {
                let available = self.queue.len();
                self.queue.take_into(available, &mut self.pending.raw);
                Step::Stall
            }
        }
    }

    fn begin_var(&mut self, mnemonic: &str, name: &str, sub: VarPhase) -> Step {
        self.pending.mnemonic = mnemonic.to_string();
        self.pending.name = name.to_string();
        self.pending.param_start = self.pending.raw.len();
        self.phase = Phase::VarParams(sub);
        Step::Continue
    }

    /// Complete the pending command and return to `Idle`.
    fn emit_pending(&mut self) -> Step {
        let pending = std::mem::take(&mut self.pending);
        let params = if pending.raw.len() > pending.param_start {
            describe::describe(&pending.mnemonic, &pending.raw[pending.param_start..])
        } else {
            String::new()
        };
        self.phase = Phase::Idle;
        Step::Emit(CommandRecord::new(pending.mnemonic, pending.name, params, pending.raw))
    }

    /// Recovery path for inconsistent state: drop the partial command,
    /// keep the buffer, continue parsing.
    fn reset(&mut self) -> Step {
        self.pending = Pending::default();
        self.phase = Phase::Idle;
        Step::Continue
    }
}

/// Decode a text run. GB18030 is attempted first because it is the
/// emulated device's native encoding; it is a superset of ASCII and wins
/// over UTF-8 on any byte sequence both can decode. Latin-1 maps every
/// byte to a character, so the chain cannot fail.
fn decode_text(bytes: &[u8]) -> String {
    if let Some(text) =
        encoding_rs::GB18030.decode_without_bom_handling_and_without_replacement(bytes)
    {
        return text.into_owned();
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_owned();
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}
