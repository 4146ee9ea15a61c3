// Copyright 2026 The raw-flat-file authors.
// See the "LICENSE.txt" file at the top-level directory of this distribution.
//
// Licensed under the MIT license. This file may not be copied, modified,
// or distributed except according to those terms.

//! Refillable input window over a byte source, with BOM sniffing and
//! UTF-16 -> UTF-8 re-encoding.

use std::io::{self, Cursor, Read};

use arrayvec::ArrayVec;

/// Encoding detected from a file's leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEncoding {
    /// `EF BB BF`: UTF-8 with an explicit byte order mark.
    Utf8WithBom,
    /// `FF FE`: UTF-16, little-endian.
    Utf16Le,
    /// `FE FF`: UTF-16, big-endian.
    Utf16Be,
}

/// Smallest buffer size callers may configure; below this, a single
/// multi-byte cell could never fit in the window at all.
pub const MIN_BUFFER_SIZE: usize = 4;

/// A refillable window `[start, end)` into a fixed-capacity byte array,
/// fed from an underlying source. The parser owns advancing `start`;
/// `refill` only runs when the parser asks for more bytes.
pub(crate) struct InputBuffer {
    source: Box<dyn Read>,
    storage: Vec<u8>,
    pub(crate) start: usize,
    pub(crate) end: usize,
    at_end_of_stream: bool,
    file_encoding: Option<FileEncoding>,
}

impl InputBuffer {
    /// Sniffs a BOM from `source`, then wraps it (applying UTF-16 -> UTF-8
    /// re-encoding if needed) in a window of `buffer_size` bytes.
    pub(crate) fn new(mut source: impl Read + 'static, buffer_size: usize) -> io::Result<Self> {
        let buffer_size = buffer_size.max(MIN_BUFFER_SIZE);
        let (encoding, source): (Option<FileEncoding>, Box<dyn Read>) =
            match sniff_bom(&mut source)? {
                Sniffed::Utf16Le => (Some(FileEncoding::Utf16Le), Box::new(Utf16Adapter::new(source, Endianness::Little))),
                Sniffed::Utf16Be => (Some(FileEncoding::Utf16Be), Box::new(Utf16Adapter::new(source, Endianness::Big))),
                Sniffed::Utf8Bom => (Some(FileEncoding::Utf8WithBom), Box::new(source)),
                Sniffed::None(leftover) => (None, Box::new(Cursor::new(leftover).chain(source))),
            };

        let mut buffer = Self {
            source,
            storage: vec![0u8; buffer_size],
            start: 0,
            end: 0,
            at_end_of_stream: false,
            file_encoding: encoding,
        };
        buffer.refill()?;
        Ok(buffer)
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.storage
    }

    pub(crate) fn file_encoding(&self) -> Option<FileEncoding> {
        self.file_encoding
    }

    pub(crate) fn at_end_of_stream(&self) -> bool {
        self.at_end_of_stream
    }

    /// True once the window fills the whole buffer, or the source is
    /// exhausted and no more bytes can arrive.
    pub(crate) fn is_full(&self) -> bool {
        self.end - self.start == self.storage.len() || self.at_end_of_stream
    }

    /// Compacts `[start, end)` to the front of the buffer and fills the
    /// rest from the source.
    pub(crate) fn refill(&mut self) -> io::Result<()> {
        if self.at_end_of_stream {
            return Ok(());
        }

        self.storage.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;

        while self.end < self.storage.len() {
            let read = self.source.read(&mut self.storage[self.end..])?;
            if read == 0 {
                self.at_end_of_stream = true;
                break;
            }
            self.end += read;
        }
        Ok(())
    }
}

enum Sniffed {
    Utf16Le,
    Utf16Be,
    Utf8Bom,
    /// No BOM was present; these bytes were already consumed from the
    /// source and must be replayed as ordinary content.
    None(ArrayVec<u8, 3>),
}

fn read_one(source: &mut impl Read) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        return match source.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => Err(e),
        };
    }
}

fn sniff_bom(source: &mut impl Read) -> io::Result<Sniffed> {
    let mut peeked: ArrayVec<u8, 3> = ArrayVec::new();
    let Some(b0) = read_one(source)? else {
        return Ok(Sniffed::None(peeked));
    };
    peeked.push(b0);
    let Some(b1) = read_one(source)? else {
        return Ok(Sniffed::None(peeked));
    };
    peeked.push(b1);

    match (b0, b1) {
        (0xFF, 0xFE) => return Ok(Sniffed::Utf16Le),
        (0xFE, 0xFF) => return Ok(Sniffed::Utf16Be),
        (0xEF, 0xBB) => {
            let Some(b2) = read_one(source)? else {
                return Ok(Sniffed::None(peeked));
            };
            if b2 == 0xBF {
                return Ok(Sniffed::Utf8Bom);
            }
            peeked.push(b2);
            Ok(Sniffed::None(peeked))
        }
        _ => Ok(Sniffed::None(peeked)),
    }
}

#[derive(Debug, Clone, Copy)]
enum Endianness {
    Little,
    Big,
}

/// Decodes UTF-16 from `source` and re-encodes it as UTF-8 on the fly,
/// buffering any trailing half-unit between reads rather than splitting a
/// surrogate pair across them.
struct Utf16Adapter<R> {
    source: R,
    endianness: Endianness,
    raw: [u8; 4096],
    raw_len: usize,
    pending_high_surrogate: Option<u16>,
    out: Vec<u8>,
    out_pos: usize,
    source_eof: bool,
}

impl<R: Read> Utf16Adapter<R> {
    fn new(source: R, endianness: Endianness) -> Self {
        Self {
            source,
            endianness,
            raw: [0u8; 4096],
            raw_len: 0,
            pending_high_surrogate: None,
            out: Vec::new(),
            out_pos: 0,
            source_eof: false,
        }
    }

    fn code_unit(&self, i: usize) -> u16 {
        let bytes = [self.raw[i], self.raw[i + 1]];
        match self.endianness {
            Endianness::Little => u16::from_le_bytes(bytes),
            Endianness::Big => u16::from_be_bytes(bytes),
        }
    }

    fn decode_available(&mut self) -> io::Result<()> {
        let complete_len = self.raw_len - (self.raw_len % 2);
        let mut i = 0;
        while i < complete_len {
            let unit = self.code_unit(i);
            i += 2;

            if let Some(high) = self.pending_high_surrogate.take() {
                if (0xDC00..=0xDFFF).contains(&unit) {
                    let c = 0x10000
                        + ((u32::from(high) - 0xD800) << 10)
                        + (u32::from(unit) - 0xDC00);
                    let ch = char::from_u32(c).ok_or_else(invalid_data)?;
                    let mut buf = [0u8; 4];
                    self.out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                } else {
                    return Err(invalid_data());
                }
                continue;
            }

            if (0xD800..=0xDBFF).contains(&unit) {
                self.pending_high_surrogate = Some(unit);
            } else if (0xDC00..=0xDFFF).contains(&unit) {
                return Err(invalid_data());
            } else {
                let ch = char::from_u32(u32::from(unit)).ok_or_else(invalid_data)?;
                let mut buf = [0u8; 4];
                self.out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
        }

        // Carry any odd trailing byte to the front for the next refill.
        if self.raw_len % 2 == 1 {
            self.raw[0] = self.raw[self.raw_len - 1];
            self.raw_len = 1;
        } else {
            self.raw_len = 0;
        }
        Ok(())
    }
}

fn invalid_data() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "invalid UTF-16 sequence")
}

impl<R: Read> Read for Utf16Adapter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.out_pos < self.out.len() {
                let n = (self.out.len() - self.out_pos).min(buf.len());
                buf[..n].copy_from_slice(&self.out[self.out_pos..self.out_pos + n]);
                self.out_pos += n;
                if self.out_pos == self.out.len() {
                    self.out.clear();
                    self.out_pos = 0;
                }
                return Ok(n);
            }

            if self.source_eof {
                if self.raw_len % 2 == 1 {
                    return Err(invalid_data());
                }
                if self.pending_high_surrogate.is_some() {
                    return Err(invalid_data());
                }
                return Ok(0);
            }

            let read = self.source.read(&mut self.raw[self.raw_len..])?;
            if read == 0 {
                self.source_eof = true;
            } else {
                self.raw_len += read;
            }
            self.decode_available()?;
        }
    }
}
