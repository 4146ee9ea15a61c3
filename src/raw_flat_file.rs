// Copyright 2026 The raw-flat-file authors.
// See the "LICENSE.txt" file at the top-level directory of this distribution.
//
// Licensed under the MIT license. This file may not be copied, modified,
// or distributed except according to those terms.

//! The parsed, content-addressed representation of a delimited text table.

use std::io::Read;

use crate::errors::{ConsistencyError, Result};
use crate::input_buffer::FileEncoding;
use crate::parser::{self, ParserOptions, UnexpectedCell};

/// A parsed delimited table: a dictionary of distinct cell values plus a
/// flat `rows * columns` array of references into it.
#[derive(Debug, Clone)]
pub struct RawFlatFile {
    columns: u16,
    cells: Vec<u32>,
    content: Vec<Vec<u8>>,
    separator: u8,
    space_separated_headers: bool,
    file_encoding: Option<FileEncoding>,
    unexpected_cells: Vec<UnexpectedCell>,
    is_truncated: bool,
}

impl RawFlatFile {
    /// Parses `source` into a [`RawFlatFile`], applying `options`' limits.
    pub fn parse<R: Read + 'static>(source: R, options: &ParserOptions) -> Result<Self> {
        let output = parser::parse(source, options)?;
        let rff = Self {
            columns: output.columns,
            cells: output.cells,
            content: output.content,
            separator: output.separator,
            space_separated_headers: output.space_separated_headers,
            file_encoding: output.file_encoding,
            unexpected_cells: output.unexpected_cells,
            is_truncated: output.is_truncated,
        };
        rff.check_consistency()?;
        Ok(rff)
    }

    /// Builds a [`RawFlatFile`] directly from already-decoded parts, e.g.
    /// after [`crate::Deserializer::read`]. Checks the same invariants
    /// [`Self::parse`] does.
    pub(crate) fn from_parts(
        columns: u16,
        cells: Vec<u32>,
        content: Vec<Vec<u8>>,
        separator: u8,
        space_separated_headers: bool,
        file_encoding: Option<FileEncoding>,
    ) -> Result<Self> {
        let rff = Self {
            columns,
            cells,
            content,
            separator,
            space_separated_headers,
            file_encoding,
            unexpected_cells: Vec::new(),
            is_truncated: false,
        };
        rff.check_consistency()?;
        Ok(rff)
    }

    /// Number of columns; `0` for an empty input.
    pub fn columns(&self) -> u16 {
        self.columns
    }

    /// Flat `rows * columns` array of content references.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// The content dictionary; index `0` is always the empty value.
    pub fn content(&self) -> &[Vec<u8>] {
        &self.content
    }

    /// The detected (or space-converted) field separator byte.
    pub fn separator(&self) -> u8 {
        self.separator
    }

    /// Whether the header line was split on spaces rather than `separator`.
    pub fn space_separated_headers(&self) -> bool {
        self.space_separated_headers
    }

    /// The byte order mark detected at the start of the input, if any.
    pub fn file_encoding(&self) -> Option<FileEncoding> {
        self.file_encoding
    }

    /// Non-empty cells seen beyond their row's declared column count.
    pub fn unexpected_cells(&self) -> &[UnexpectedCell] {
        &self.unexpected_cells
    }

    /// Whether parsing stopped early because of a configured limit.
    pub fn is_truncated(&self) -> bool {
        self.is_truncated
    }

    /// Number of data rows (excluding the header line).
    pub fn rows(&self) -> usize {
        if self.columns == 0 || self.cells.is_empty() {
            0
        } else {
            self.cells.len() / self.columns as usize - 1
        }
    }

    /// Looks up the bytes at `(line, column)`, where `line` is zero-based
    /// and `0` is the header line.
    pub fn get_item(&self, line: usize, column: usize) -> Option<&[u8]> {
        if self.columns == 0 || column >= self.columns as usize {
            return None;
        }
        let index = line * self.columns as usize + column;
        let id = *self.cells.get(index)?;
        self.content.get(id as usize).map(Vec::as_slice)
    }

    /// Validates the four structural invariants a well-formed
    /// [`RawFlatFile`] must hold.
    pub fn check_consistency(&self) -> core::result::Result<(), ConsistencyError> {
        if self.content.first().map(Vec::len) != Some(0) {
            return Err(ConsistencyError::FirstContentEntryNotEmpty {
                len: self.content.first().map(Vec::len).unwrap_or(0),
            });
        }

        if self.columns == 0 {
            if !self.cells.is_empty() {
                return Err(ConsistencyError::ZeroColumnsWithCells {
                    cell_count: self.cells.len(),
                });
            }
            if self.content.len() != 1 {
                return Err(ConsistencyError::ZeroColumnsWithExtraContent {
                    content_len: self.content.len(),
                });
            }
            return Ok(());
        }

        if self.cells.len() % self.columns as usize != 0 {
            return Err(ConsistencyError::CellCountNotMultipleOfColumns {
                cell_count: self.cells.len(),
                columns: self.columns,
            });
        }

        let mut max_seen = 0u32;
        for (index, &id) in self.cells.iter().enumerate() {
            if id > max_seen + 1 {
                return Err(ConsistencyError::CellOutOfOrder {
                    index,
                    value: id,
                    max_allowed: max_seen + 1,
                });
            }
            if id == max_seen + 1 {
                max_seen = id;
            }
        }

        let mut seen: std::collections::HashMap<&[u8], usize> = std::collections::HashMap::new();
        for (index, entry) in self.content.iter().enumerate().skip(1) {
            if let Some(&first) = seen.get(entry.as_slice()) {
                return Err(ConsistencyError::DuplicateContentEntry {
                    first,
                    second: index,
                });
            }
            seen.insert(entry.as_slice(), index);
        }

        Ok(())
    }
}
