// src/transform/fonts/woff2.rs

//! WOFF 2.0 encoder.
//!
//! Tables are stored with the null transform (no glyf/loca or hmtx
//! reconstruction), concatenated and compressed as one brotli stream.

use std::io::Write;

use anyhow::{Context, Result};

use super::sfnt::{self, Sfnt};

pub const SIGNATURE: u32 = u32::from_be_bytes(*b"wOF2");
const HEADER_LEN: usize = 48;

/// Index 63 in the flags byte means "arbitrary tag follows".
const ARBITRARY_TAG: u8 = 0x3f;
/// glyf/loca use transform version 3 for "not transformed"; every other
/// table uses 0.
const NULL_TRANSFORM_GLYF_LOCA: u8 = 3 << 6;

const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 11;
const BROTLI_LG_WINDOW: u32 = 22;

pub fn is_woff2(bytes: &[u8]) -> bool {
    sfnt::read_u32(bytes, 0).is_ok_and(|sig| sig == SIGNATURE)
}

pub fn encode(font: &Sfnt) -> Result<Vec<u8>> {
    let font = font.finalized();
    let num_tables = font.tables.len();

    let mut directory = Vec::new();
    let mut stream = Vec::with_capacity(font.tables.iter().map(|t| t.data.len()).sum());
    for table in &font.tables {
        let transform_bits = match &table.tag {
            b"glyf" | b"loca" => NULL_TRANSFORM_GLYF_LOCA,
            _ => 0,
        };
        match KNOWN_TAGS.iter().position(|known| *known == &table.tag) {
            Some(idx) => directory.push(idx as u8 | transform_bits),
            None => {
                directory.push(ARBITRARY_TAG | transform_bits);
                directory.extend_from_slice(&table.tag);
            }
        }
        push_base128(&mut directory, table.data.len() as u32);
        stream.extend_from_slice(&table.data);
    }

    let compressed = brotli_compress(&stream).context("brotli-compressing font tables")?;

    let total_len = sfnt::padded_len(HEADER_LEN + directory.len() + compressed.len());
    let mut out = Vec::with_capacity(total_len);
    sfnt::push_u32(&mut out, SIGNATURE);
    sfnt::push_u32(&mut out, font.flavor);
    sfnt::push_u32(&mut out, total_len as u32);
    sfnt::push_u16(&mut out, num_tables as u16);
    sfnt::push_u16(&mut out, 0);
    sfnt::push_u32(&mut out, font.sfnt_size() as u32);
    sfnt::push_u32(&mut out, compressed.len() as u32);
    sfnt::push_u16(&mut out, 1);
    sfnt::push_u16(&mut out, 0);
    for _ in 0..5 {
        sfnt::push_u32(&mut out, 0);
    }
    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    sfnt::pad4(&mut out);

    Ok(out)
}

/// UIntBase128: big-endian 7-bit groups, high bit set on all but the last.
fn push_base128(out: &mut Vec<u8>, value: u32) {
    let mut groups = [0u8; 5];
    let mut n = 0;
    let mut v = value;
    loop {
        groups[n] = (v & 0x7f) as u8;
        n += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let continuation = if i > 0 { 0x80 } else { 0 };
        out.push(groups[i] | continuation);
    }
}

fn brotli_compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut writer =
        brotli::CompressorWriter::new(Vec::new(), BROTLI_BUFFER, BROTLI_QUALITY, BROTLI_LG_WINDOW);
    writer.write_all(data)?;
    Ok(writer.into_inner())
}
