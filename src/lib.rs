// Copyright 2026 The raw-flat-file authors.
// See the "LICENSE.txt" file at the top-level directory of this distribution.
//
// Licensed under the MIT license. This file may not be copied, modified,
// or distributed except according to those terms.

#![doc = include_str!("../README.md")]
#![warn(
    missing_docs,
    keyword_idents,
    macro_use_extern_crate,
    missing_debug_implementations,
    non_ascii_idents,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_extern_crates,
    unused_import_braces,
    unused_labels,
    variant_size_differences,
    unused_qualifications,
    clippy::must_use_candidate
)]

mod errors;
mod input_buffer;
mod parser;
mod raw_flat_file;
mod serializer;
mod trie;
mod varint;

pub use errors::{ConsistencyError, Error, Result};
pub use input_buffer::FileEncoding;
pub use parser::{ParserOptions, UnexpectedCell};
pub use raw_flat_file::RawFlatFile;
pub use serializer::{Deserializer, Serializer};
