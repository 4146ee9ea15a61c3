// Copyright 2026 The raw-flat-file authors.
// See the "LICENSE.txt" file at the top-level directory of this distribution.
//
// Licensed under the MIT license. This file may not be copied, modified,
// or distributed except according to those terms.

//! Binary encoding of a [`RawFlatFile`]: a fixed-width header followed by
//! varint-encoded cells and length-prefixed content blobs.

use std::io::Write;

use nom::number::complete::{le_u16, le_u32, le_u8};
use nom::IResult;

use crate::errors::{Error, Result};
use crate::raw_flat_file::RawFlatFile;
use crate::varint;

const VERSION: u8 = 1;
const HEADER_LEN: usize = 1 + 2 + 4 + 4;

/// Writes a [`RawFlatFile`] in this crate's binary format.
#[derive(Debug, Clone, Copy)]
pub struct Serializer;

impl Serializer {
    /// Writes `rff` to `writer` per the format described in this module.
    pub fn write<W: Write>(rff: &RawFlatFile, mut writer: W) -> Result<()> {
        writer.write_all(&[VERSION])?;
        writer.write_all(&rff.columns().to_le_bytes())?;
        writer.write_all(&(rff.cells().len() as u32).to_le_bytes())?;
        writer.write_all(&(rff.content().len() as u32).to_le_bytes())?;

        let mut varint_buf = Vec::with_capacity(varint::MAX_ENCODED_LEN);
        for &cell in rff.cells() {
            varint_buf.clear();
            varint::write(cell, &mut varint_buf);
            writer.write_all(&varint_buf)?;
        }

        for blob in rff.content() {
            varint_buf.clear();
            varint::write(blob.len() as u32, &mut varint_buf);
            writer.write_all(&varint_buf)?;
            writer.write_all(blob)?;
        }

        Ok(())
    }
}

/// Reads a [`RawFlatFile`] previously written by [`Serializer::write`].
#[derive(Debug, Clone, Copy)]
pub struct Deserializer;

impl Deserializer {
    /// Parses `bytes` as a complete RFF binary blob.
    pub fn read(bytes: &[u8]) -> Result<RawFlatFile> {
        let version = *bytes
            .first()
            .ok_or(Error::ShortRead { expected: HEADER_LEN, actual: 0 })?;
        if version != VERSION {
            return Err(Error::BadVersion { found: version });
        }

        let (mut rest, header) =
            fixed_header(bytes).map_err(|_| Error::ShortRead { expected: HEADER_LEN, actual: bytes.len() })?;

        let mut cells = Vec::with_capacity(header.cell_count as usize);
        for _ in 0..header.cell_count {
            let (next, value) = varint::varint(rest)
                .map_err(|_| Error::ShortRead { expected: 1, actual: rest.len() })?;
            cells.push(value);
            rest = next;
        }

        let mut content = Vec::with_capacity(header.content_count as usize);
        for _ in 0..header.content_count {
            let (next, len) = varint::varint(rest)
                .map_err(|_| Error::ShortRead { expected: 1, actual: rest.len() })?;
            let len = len as usize;
            if next.len() < len {
                return Err(Error::ShortRead { expected: len, actual: next.len() });
            }
            let (blob, next) = next.split_at(len);
            content.push(blob.to_vec());
            rest = next;
        }

        RawFlatFile::from_parts(header.columns, cells, content, b'\t', false, None)
    }
}

struct FixedHeader {
    columns: u16,
    cell_count: u32,
    content_count: u32,
}

/// Parses the version byte plus the three fixed-width header fields. The
/// version has already been checked by the caller; this only re-consumes it
/// so the returned `rest` lines up with [`HEADER_LEN`].
fn fixed_header(input: &[u8]) -> IResult<&[u8], FixedHeader> {
    let (input, _version) = le_u8(input)?;
    let (input, columns) = le_u16(input)?;
    let (input, cell_count) = le_u32(input)?;
    let (input, content_count) = le_u32(input)?;
    Ok((
        input,
        FixedHeader {
            columns,
            cell_count,
            content_count,
        },
    ))
}
