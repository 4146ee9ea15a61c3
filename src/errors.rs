// Copyright 2026 The raw-flat-file authors.
// See the "LICENSE.txt" file at the top-level directory of this distribution.
//
// Licensed under the MIT license. This file may not be copied, modified,
// or distributed except according to those terms.

//! Error types returned by this crate.

/// Information about a failure of an operation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Reading from the input source failed.
    #[error("failed to read from source")]
    Io(#[from] std::io::Error),

    /// The deserializer encountered a version byte it does not understand.
    #[error("unknown version number: {found}")]
    BadVersion {
        /// The version byte actually present in the stream.
        found: u8,
    },

    /// Fewer bytes were available than the format requires.
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Number of bytes the format required at this point.
        expected: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// A `ParserOptions` value failed validation.
    #[error("invalid parser option: {reason}")]
    InvalidParserOptions {
        /// Human-readable description of the violated constraint.
        reason: &'static str,
    },

    /// A `RawFlatFile` failed its consistency check.
    #[error(transparent)]
    Inconsistent(#[from] ConsistencyError),
}

/// Result of a fallible operation.
pub type Result<T> = core::result::Result<T, Error>;

/// A specific invariant violation found by [`crate::RawFlatFile::check_consistency`].
///
/// Each variant names the offending index and/or value, so callers can
/// report exactly what was wrong without re-deriving it.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConsistencyError {
    /// `content[0]` was not the empty byte array.
    #[error("content[0] must be empty, found {len} bytes")]
    FirstContentEntryNotEmpty {
        /// Length of the byte array actually found at `content[0]`.
        len: usize,
    },

    /// `columns == 0` but `cells` was non-empty.
    #[error("columns is 0 but cells has {cell_count} entries")]
    ZeroColumnsWithCells {
        /// Number of entries found in `cells`.
        cell_count: usize,
    },

    /// `columns == 0` but `content` did not have exactly one entry.
    #[error("columns is 0 but content has {content_len} entries, expected 1")]
    ZeroColumnsWithExtraContent {
        /// Number of entries found in `content`.
        content_len: usize,
    },

    /// `|cells|` was not a multiple of `columns`.
    #[error("cells length {cell_count} is not a multiple of columns {columns}")]
    CellCountNotMultipleOfColumns {
        /// Number of entries found in `cells`.
        cell_count: usize,
        /// Declared column count.
        columns: u16,
    },

    /// A cell referenced an identifier that had not yet been introduced in
    /// first-use order, or that falls outside `content`.
    #[error(
        "cells[{index}] = {value} is not a valid reference: \
         expected 0..={max_allowed} at this point in the stream"
    )]
    CellOutOfOrder {
        /// Index into `cells` of the offending entry.
        index: usize,
        /// The offending value.
        value: u32,
        /// The highest identifier that could legally appear at this point.
        max_allowed: u32,
    },

    /// Two distinct indices in `content` held byte-for-byte identical,
    /// non-empty entries.
    #[error("content[{first}] and content[{second}] are duplicate entries")]
    DuplicateContentEntry {
        /// The earlier of the two duplicate indices.
        first: usize,
        /// The later of the two duplicate indices.
        second: usize,
    },
}
