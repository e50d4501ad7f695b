// src/transform/fonts/woff.rs

//! WOFF 1.0: per-table zlib compression around an sfnt.

use std::io::{Read, Write};

use anyhow::{ensure, Context, Result};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::sfnt::{self, Sfnt, Table};

pub const SIGNATURE: u32 = u32::from_be_bytes(*b"wOFF");
const HEADER_LEN: usize = 44;
const DIR_ENTRY_LEN: usize = 20;

pub fn is_woff(bytes: &[u8]) -> bool {
    sfnt::read_u32(bytes, 0).is_ok_and(|sig| sig == SIGNATURE)
}

pub fn encode(font: &Sfnt) -> Result<Vec<u8>> {
    let font = font.finalized();
    let num_tables = font.tables.len();

    let mut blobs = Vec::with_capacity(num_tables);
    for table in &font.tables {
        let compressed = zlib(&table.data)
            .with_context(|| format!("compressing table '{}'", table.tag_str()))?;
        // Tables that do not shrink are stored raw.
        blobs.push(if compressed.len() < table.data.len() {
            compressed
        } else {
            table.data.clone()
        });
    }

    let mut offset = HEADER_LEN + DIR_ENTRY_LEN * num_tables;
    let mut directory = Vec::with_capacity(DIR_ENTRY_LEN * num_tables);
    for (table, blob) in font.tables.iter().zip(&blobs) {
        directory.extend_from_slice(&table.tag);
        sfnt::push_u32(&mut directory, offset as u32);
        sfnt::push_u32(&mut directory, blob.len() as u32);
        sfnt::push_u32(&mut directory, table.data.len() as u32);
        sfnt::push_u32(&mut directory, sfnt::table_checksum(table));
        offset += sfnt::padded_len(blob.len());
    }
    let total_len = offset;

    let mut out = Vec::with_capacity(total_len);
    sfnt::push_u32(&mut out, SIGNATURE);
    sfnt::push_u32(&mut out, font.flavor);
    sfnt::push_u32(&mut out, total_len as u32);
    sfnt::push_u16(&mut out, num_tables as u16);
    sfnt::push_u16(&mut out, 0);
    sfnt::push_u32(&mut out, font.sfnt_size() as u32);
    sfnt::push_u16(&mut out, 1);
    sfnt::push_u16(&mut out, 0);
    // metadata and private blocks: offset, length, original length / offset, length
    for _ in 0..5 {
        sfnt::push_u32(&mut out, 0);
    }
    out.extend_from_slice(&directory);
    for blob in &blobs {
        out.extend_from_slice(blob);
        sfnt::pad4(&mut out);
    }

    Ok(out)
}

pub fn decode(bytes: &[u8]) -> Result<Sfnt> {
    ensure!(bytes.len() >= HEADER_LEN, "woff file too short");
    ensure!(is_woff(bytes), "missing wOFF signature");

    let flavor = sfnt::read_u32(bytes, 4)?;
    let num_tables = usize::from(sfnt::read_u16(bytes, 12)?);

    let mut tables = Vec::with_capacity(num_tables);
    for i in 0..num_tables {
        let entry = HEADER_LEN + i * DIR_ENTRY_LEN;
        let tag = sfnt::read_tag(bytes, entry)?;
        let offset = sfnt::read_u32(bytes, entry + 4)? as usize;
        let comp_len = sfnt::read_u32(bytes, entry + 8)? as usize;
        let orig_len = sfnt::read_u32(bytes, entry + 12)? as usize;
        let raw = sfnt::slice(bytes, offset, comp_len)?;

        let data = if comp_len < orig_len {
            let mut data = Vec::with_capacity(orig_len);
            ZlibDecoder::new(raw)
                .read_to_end(&mut data)
                .with_context(|| format!("inflating table '{}'", String::from_utf8_lossy(&tag)))?;
            ensure!(
                data.len() == orig_len,
                "table '{}' inflated to {} bytes, expected {orig_len}",
                String::from_utf8_lossy(&tag),
                data.len()
            );
            data
        } else {
            raw.to_vec()
        };
        tables.push(Table { tag, data });
    }

    Ok(Sfnt::new(flavor, tables))
}

fn zlib(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}
