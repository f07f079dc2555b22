// src/exec/line_codec.rs

//! Line framing for captured output.

use std::io;

use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Longest line emitted as a single event, in bytes.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Splits a byte stream on `\n` into lossily decoded lines.
///
/// A trailing `\r` is stripped. A run of more than `max_len` bytes without a
/// newline is emitted in `max_len`-byte chunks, so the buffer never grows past
/// that. A chunk boundary can fall inside a multi-byte character, which then
/// decodes as U+FFFD on both sides.
#[derive(Debug, Clone)]
pub struct LineDecoder {
    max_len: usize,
    // Bytes already scanned for `\n`.
    scanned: usize,
}

impl LineDecoder {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
            scanned: 0,
        }
    }

    fn take(&mut self, src: &mut BytesMut, len: usize) -> String {
        self.scanned = 0;
        let raw = src.split_to(len);
        let line = raw.strip_suffix(b"\n").unwrap_or(&raw[..]);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        String::from_utf8_lossy(line).into_owned()
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new(MAX_LINE_BYTES)
    }
}

impl Decoder for LineDecoder {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, io::Error> {
        let limit = src.len().min(self.max_len);
        let found = src[self.scanned..limit].iter().position(|b| *b == b'\n');

        match found {
            Some(offset) => {
                let len = self.scanned + offset + 1;
                Ok(Some(self.take(src, len)))
            }
            None if src.len() >= self.max_len => {
                let len = self.max_len;
                Ok(Some(self.take(src, len)))
            }
            None => {
                self.scanned = limit;
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, io::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let len = src.len();
        Ok(Some(self.take(src, len)))
    }
}
