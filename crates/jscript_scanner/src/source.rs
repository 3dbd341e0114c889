//! Character sources for the scanner.
//!
//! A source is either a complete in-memory string or a blocking byte
//! reader. Readers are decoded as UTF-8 into a character buffer that is
//! refilled on demand, reading geometrically larger chunks each time the
//! buffered text runs out. Characters are never discarded, so offsets stay
//! valid for the whole scan.

use std::io::{self, Read};

const INITIAL_CHUNK: usize = 4 * 1024;
const MAX_CHUNK: usize = 1024 * 1024;

pub struct SourceBuffer {
    chars: Vec<char>,
    reader: Option<Box<dyn Read>>,
    /// Bytes read but not yet decoded (an incomplete UTF-8 sequence).
    pending: Vec<u8>,
    chunk: usize,
    read_error: Option<io::Error>,
}

impl SourceBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            reader: None,
            pending: Vec::new(),
            chunk: INITIAL_CHUNK,
            read_error: None,
        }
    }

    pub fn from_reader<R: Read + 'static>(reader: R) -> Self {
        Self {
            chars: Vec::new(),
            reader: Some(Box::new(reader)),
            pending: Vec::new(),
            chunk: INITIAL_CHUNK,
            read_error: None,
        }
    }

    /// The character at `index`, reading more input if needed.
    #[inline]
    pub fn get(&mut self, index: usize) -> Option<char> {
        while index >= self.chars.len() {
            if !self.refill() {
                return None;
            }
        }
        Some(self.chars[index])
    }

    /// Characters in `start..end` of the already buffered text.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }

    /// Number of characters decoded so far.
    pub fn buffered_len(&self) -> usize {
        self.chars.len()
    }

    /// The I/O error that ended a streaming source early, if any.
    pub fn take_read_error(&mut self) -> Option<io::Error> {
        self.read_error.take()
    }

    /// Read and decode one more chunk. Returns false once the input is exhausted.
    fn refill(&mut self) -> bool {
        let Some(mut reader) = self.reader.take() else {
            return false;
        };
        let before = self.chars.len();
        let mut buf = vec![0u8; self.chunk];
        let mut open = true;
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    open = false;
                    if !self.pending.is_empty() {
                        // Truncated multi-byte sequence at end of input.
                        self.pending.clear();
                        self.chars.push(char::REPLACEMENT_CHARACTER);
                    }
                    break;
                }
                Ok(n) => {
                    self.pending.extend_from_slice(&buf[..n]);
                    self.decode_pending();
                    if self.chars.len() > before {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "source read failed");
                    self.read_error = Some(e);
                    open = false;
                    break;
                }
            }
        }
        if open {
            self.reader = Some(reader);
        }
        self.chunk = (self.chunk * 2).min(MAX_CHUNK);
        self.chars.len() > before
    }

    fn decode_pending(&mut self) {
        let mut consumed = 0;
        loop {
            let rest = &self.pending[consumed..];
            match simdutf8::compat::from_utf8(rest) {
                Ok(text) => {
                    self.chars.extend(text.chars());
                    consumed = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // The prefix was just validated.
                    if let Ok(text) = std::str::from_utf8(&rest[..valid]) {
                        self.chars.extend(text.chars());
                    }
                    match e.error_len() {
                        Some(bad) => {
                            self.chars.push(char::REPLACEMENT_CHARACTER);
                            consumed += valid + bad;
                        }
                        None => {
                            // Incomplete sequence: wait for more bytes.
                            consumed += valid;
                            break;
                        }
                    }
                }
            }
        }
        self.pending.drain(..consumed);
    }
}

impl std::fmt::Debug for SourceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceBuffer")
            .field("buffered", &self.chars.len())
            .field("streaming", &self.reader.is_some())
            .finish()
    }
}
