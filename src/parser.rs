// Copyright 2026 The raw-flat-file authors.
// See the "LICENSE.txt" file at the top-level directory of this distribution.
//
// Licensed under the MIT license. This file may not be copied, modified,
// or distributed except according to those terms.

//! Byte-level state machine that turns a delimited text stream into cell
//! references plus a content dictionary.

use std::io::Read;

use crate::errors::{Error, Result};
use crate::input_buffer::{FileEncoding, InputBuffer};
use crate::trie::Trie;

/// Hard cap on how many bytes of a single cell are kept; longer cells are
/// truncated silently rather than rejected.
pub(crate) const MAXIMAL_VALUE_LENGTH: usize = 4096;

/// Minimum `read_buffer_size` a caller may configure.
pub const MIN_READ_BUFFER_SIZE: usize = 4096;

/// Default `read_buffer_size`: 100 MiB.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 100 * 1024 * 1024;

const SEPARATOR_CANDIDATES: [u8; 5] = [b'\t', b';', b',', b'|', b' '];

/// Diagnostic record for a non-empty cell found beyond the declared column
/// count of its row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct UnexpectedCell {
    /// Zero-based line on which the cell appeared (the header is line 0).
    pub line: u64,
    /// Zero-based column at which the cell would have landed.
    pub column: u32,
    /// The cell's bytes.
    pub bytes: Vec<u8>,
    /// Name of the header column at this position, when known. The core
    /// parser never populates this — it is a diagnostic-layer concern.
    pub column_name: Option<String>,
}

/// Limits and tuning knobs for [`crate::RawFlatFile::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    max_line_count: Option<u64>,
    max_cell_count: Option<u64>,
    read_buffer_size: usize,
}

impl ParserOptions {
    /// Returns the default options: unbounded lines and cells, a
    /// 100 MiB read buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of non-header lines parsed.
    #[must_use]
    pub fn with_max_line_count(mut self, max_line_count: u64) -> Self {
        self.max_line_count = Some(max_line_count);
        self
    }

    /// Caps the number of non-header cells parsed.
    #[must_use]
    pub fn with_max_cell_count(mut self, max_cell_count: u64) -> Self {
        self.max_cell_count = Some(max_cell_count);
        self
    }

    /// Sets the size of the refillable read buffer. Must be at least
    /// [`MIN_READ_BUFFER_SIZE`].
    #[must_use]
    pub fn with_read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.read_buffer_size < MIN_READ_BUFFER_SIZE {
            return Err(Error::InvalidParserOptions {
                reason: "read_buffer_size must be at least 4096 bytes",
            });
        }
        Ok(())
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_line_count: None,
            max_cell_count: None,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

/// Everything the parser produces, ready to be wrapped into a
/// [`crate::RawFlatFile`].
pub(crate) struct ParsedOutput {
    pub(crate) columns: u16,
    pub(crate) cells: Vec<u32>,
    pub(crate) content: Vec<Vec<u8>>,
    pub(crate) separator: u8,
    pub(crate) space_separated_headers: bool,
    pub(crate) file_encoding: Option<FileEncoding>,
    pub(crate) unexpected_cells: Vec<UnexpectedCell>,
    pub(crate) is_truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellEnd {
    Separator,
    Cr,
    Lf,
    Eof,
}

pub(crate) fn parse<R: Read + 'static>(source: R, options: &ParserOptions) -> Result<ParsedOutput> {
    options.validate()?;

    let mut buffer = InputBuffer::new(source, options.read_buffer_size)?;
    let file_encoding = buffer.file_encoding();
    let mut trie = Trie::new();

    skip_leading_blank(&mut buffer)?;
    let (separator, columns, space_separated_headers) = guess_separator(&mut buffer)?;

    let max_cell_cap = options
        .max_cell_count
        .map(|m| m.saturating_add(u64::from(columns)))
        .unwrap_or(u64::MAX);
    let max_line_cap = options
        .max_line_count
        .map(|m| u64::from(columns).saturating_mul(m.saturating_add(1)))
        .unwrap_or(u64::MAX);
    let effective_cap = max_cell_cap.min(max_line_cap);

    let mut cells: Vec<u32> = Vec::new();
    let mut unexpected_cells: Vec<UnexpectedCell> = Vec::new();
    let mut line_size = 0usize;
    let mut empty_run = 0usize;
    let mut current_line = 0u64;

    let mut active_separator = if space_separated_headers {
        b' '
    } else {
        separator
    };

    loop {
        if cells.len() as u64 >= effective_cap {
            break;
        }

        let (raw_cell, n_quotes, terminator) = scan_cell(&mut buffer, active_separator)?;
        let extracted = extract_cell(raw_cell, n_quotes);
        let id = trie.hash(&extracted, 0, extracted.len());

        commit_cell(
            id,
            columns,
            &trie,
            current_line,
            &mut unexpected_cells,
            &mut cells,
            &mut line_size,
            &mut empty_run,
        );

        match terminator {
            CellEnd::Separator => {}
            CellEnd::Cr | CellEnd::Lf => {
                end_line(columns, &mut cells, &mut line_size, &mut empty_run);
                current_line += 1;
                if space_separated_headers {
                    active_separator = separator;
                }
            }
            CellEnd::Eof => break,
        }
    }

    end_line(columns, &mut cells, &mut line_size, &mut empty_run);
    let is_truncated = cells.len() as u64 >= effective_cap;

    let columns = if cells.is_empty() { 0 } else { columns };

    Ok(ParsedOutput {
        columns,
        cells,
        content: trie.into_values(),
        separator,
        space_separated_headers,
        file_encoding,
        unexpected_cells,
        is_truncated,
    })
}

fn skip_leading_blank(buffer: &mut InputBuffer) -> Result<()> {
    loop {
        if buffer.start == buffer.end {
            if buffer.is_full() {
                return Ok(());
            }
            buffer.refill()?;
            continue;
        }
        match buffer.bytes()[buffer.start] {
            b'\n' | b'\r' | b' ' => buffer.start += 1,
            _ => return Ok(()),
        }
    }
}

/// Scans the first logical line to count separator candidates, without
/// consuming any bytes — tokenization re-reads from the same position.
fn guess_separator(buffer: &mut InputBuffer) -> Result<(u8, u16, bool)> {
    let mut counts = [0u32; SEPARATOR_CANDIDATES.len()];
    let mut offset = 0usize;

    loop {
        let idx = buffer.start + offset;
        if idx == buffer.end {
            if buffer.is_full() {
                break;
            }
            buffer.refill()?;
            continue;
        }
        match buffer.bytes()[idx] {
            b'\n' | b'\r' => break,
            byte => {
                if let Some(i) = SEPARATOR_CANDIDATES.iter().position(|&c| c == byte) {
                    counts[i] += 1;
                }
                offset += 1;
            }
        }
    }

    for (i, &candidate) in SEPARATOR_CANDIDATES.iter().enumerate() {
        if counts[i] > 0 {
            let columns = (counts[i] + 1) as u16;
            if candidate == b' ' {
                return Ok((b'\t', columns, true));
            }
            return Ok((candidate, columns, false));
        }
    }
    Ok((b'\t', 1, false))
}

/// Scans one cell, handling quote open/close/escape, and reports how it
/// ended. The returned bytes are capped at [`MAXIMAL_VALUE_LENGTH`] but
/// scanning still consumes the full cell from the source.
fn scan_cell(buffer: &mut InputBuffer, separator: u8) -> Result<(Vec<u8>, usize, CellEnd)> {
    let mut cell = Vec::new();
    let mut in_quote = false;
    let mut n_quotes = 0usize;
    let mut first = true;

    let push = |cell: &mut Vec<u8>, byte: u8| {
        if cell.len() < MAXIMAL_VALUE_LENGTH {
            cell.push(byte);
        }
    };

    loop {
        if buffer.start == buffer.end {
            if buffer.is_full() {
                return Ok((cell, n_quotes, CellEnd::Eof));
            }
            buffer.refill()?;
            continue;
        }

        let byte = buffer.bytes()[buffer.start];

        if first {
            first = false;
            if byte == b'"' {
                in_quote = true;
                n_quotes += 1;
                push(&mut cell, byte);
                buffer.start += 1;
                continue;
            }
        }

        if in_quote && byte == b'"' {
            if buffer.start + 1 == buffer.end && !buffer.is_full() {
                buffer.refill()?;
                continue;
            }
            let escaped =
                buffer.start + 1 < buffer.end && buffer.bytes()[buffer.start + 1] == b'"';
            if escaped {
                n_quotes += 1;
                push(&mut cell, b'"');
                push(&mut cell, b'"');
                buffer.start += 2;
            } else {
                in_quote = false;
                push(&mut cell, byte);
                buffer.start += 1;
            }
            continue;
        }

        if !in_quote {
            match byte {
                b'\r' => {
                    buffer.start += 1;
                    return Ok((cell, n_quotes, CellEnd::Cr));
                }
                b'\n' => {
                    buffer.start += 1;
                    return Ok((cell, n_quotes, CellEnd::Lf));
                }
                b if b == separator => {
                    buffer.start += 1;
                    return Ok((cell, n_quotes, CellEnd::Separator));
                }
                _ => {}
            }
        }

        push(&mut cell, byte);
        buffer.start += 1;
    }
}

/// Strips an enclosing pair of quotes, collapses doubled quotes, and trims
/// surrounding spaces.
fn extract_cell(mut cell: Vec<u8>, n_quotes: usize) -> Vec<u8> {
    let mut s = 0usize;
    let mut e = cell.len();

    if n_quotes > 0 && cell.len() >= 2 && cell[cell.len() - 1] == b'"' {
        s += 1;
        e -= 1;
        if n_quotes > 1 {
            let mut write = s;
            let mut read = s;
            while read < e {
                cell[write] = cell[read];
                if cell[read] == b'"' && read + 1 < e && cell[read + 1] == b'"' {
                    read += 1;
                }
                write += 1;
                read += 1;
            }
            e = write;
        }
    }

    while s < e && cell[s] == b' ' {
        s += 1;
    }
    while e > s && cell[e - 1] == b' ' {
        e -= 1;
    }

    cell.truncate(e);
    cell.drain(0..s);
    cell
}

#[allow(clippy::too_many_arguments)]
fn commit_cell(
    id: u32,
    columns: u16,
    trie: &Trie,
    current_line: u64,
    unexpected_cells: &mut Vec<UnexpectedCell>,
    cells: &mut Vec<u32>,
    line_size: &mut usize,
    empty_run: &mut usize,
) {
    let columns = columns as usize;

    if id == 0 {
        if *line_size == 0 {
            *empty_run += 1;
        } else if *line_size < columns {
            cells.push(0);
            *line_size += 1;
        }
        return;
    }

    if *empty_run > 0 {
        let room = columns.saturating_sub(*line_size);
        let flush = (*empty_run).min(room);
        cells.extend(std::iter::repeat(0).take(flush));
        *line_size += flush;
        *empty_run = 0;
    }

    if *line_size < columns {
        cells.push(id);
        *line_size += 1;
    } else {
        unexpected_cells.push(UnexpectedCell {
            line: current_line,
            column: *line_size as u32,
            bytes: trie.value(id).to_vec(),
            column_name: None,
        });
    }
}

fn end_line(columns: u16, cells: &mut Vec<u32>, line_size: &mut usize, empty_run: &mut usize) {
    if *line_size > 0 {
        cells.extend(std::iter::repeat(0).take(columns as usize - *line_size));
    }
    *line_size = 0;
    *empty_run = 0;
}

#[cfg(test)]
mod tests;
