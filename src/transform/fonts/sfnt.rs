// src/transform/fonts/sfnt.rs

//! Minimal sfnt (TrueType / OpenType) container reader and writer.
//!
//! Only the table directory is interpreted; table payloads are opaque,
//! except `head`, whose `checkSumAdjustment` is recomputed on write.

use anyhow::{bail, ensure, Result};

pub const TRUETYPE_FLAVOR: u32 = 0x0001_0000;
pub const CFF_FLAVOR: u32 = u32::from_be_bytes(*b"OTTO");
const APPLE_TRUE_FLAVOR: u32 = u32::from_be_bytes(*b"true");
const TYPE1_FLAVOR: u32 = u32::from_be_bytes(*b"typ1");
const COLLECTION_TAG: u32 = u32::from_be_bytes(*b"ttcf");

pub const SFNT_HEADER_LEN: usize = 12;
pub const SFNT_RECORD_LEN: usize = 16;

const HEAD_TAG: [u8; 4] = *b"head";
const HEAD_ADJUSTMENT: std::ops::Range<usize> = 8..12;
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub tag: [u8; 4],
    pub data: Vec<u8>,
}

impl Table {
    pub fn tag_str(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }
}

/// An in-memory font: flavor plus tables sorted by tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sfnt {
    pub flavor: u32,
    pub tables: Vec<Table>,
}

impl Sfnt {
    pub fn new(flavor: u32, mut tables: Vec<Table>) -> Self {
        tables.sort_by(|a, b| a.tag.cmp(&b.tag));
        Self { flavor, tables }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        ensure!(bytes.len() >= SFNT_HEADER_LEN, "font too short ({} bytes)", bytes.len());

        let flavor = read_u32(bytes, 0)?;
        match flavor {
            TRUETYPE_FLAVOR | CFF_FLAVOR | APPLE_TRUE_FLAVOR | TYPE1_FLAVOR => {}
            COLLECTION_TAG => bail!("font collections (.ttc) are not supported"),
            other => bail!("unrecognised sfnt version 0x{other:08x}"),
        }

        let num_tables = usize::from(read_u16(bytes, 4)?);
        ensure!(num_tables > 0, "font has no tables");

        let mut tables = Vec::with_capacity(num_tables);
        for i in 0..num_tables {
            let rec = SFNT_HEADER_LEN + i * SFNT_RECORD_LEN;
            let tag = read_tag(bytes, rec)?;
            let offset = read_u32(bytes, rec + 8)? as usize;
            let length = read_u32(bytes, rec + 12)? as usize;
            let data = slice(bytes, offset, length)
                .map_err(|e| e.context(format!("table '{}'", String::from_utf8_lossy(&tag))))?;
            tables.push(Table {
                tag,
                data: data.to_vec(),
            });
        }

        Ok(Self::new(flavor, tables))
    }

    pub fn is_truetype(&self) -> bool {
        matches!(self.flavor, TRUETYPE_FLAVOR | APPLE_TRUE_FLAVOR)
    }

    pub fn table(&self, tag: &[u8; 4]) -> Option<&Table> {
        self.tables.iter().find(|t| &t.tag == tag)
    }

    /// Size of the font when laid out as a plain sfnt file.
    pub fn sfnt_size(&self) -> usize {
        SFNT_HEADER_LEN
            + SFNT_RECORD_LEN * self.tables.len()
            + self.tables.iter().map(|t| padded_len(t.data.len())).sum::<usize>()
    }

    /// Copy of the font with `head.checkSumAdjustment` recomputed for the
    /// plain sfnt layout. All containers embed these table bytes.
    pub fn finalized(&self) -> Sfnt {
        let mut font = self.clone();
        let Some(head_idx) = font.tables.iter().position(|t| t.tag == HEAD_TAG) else {
            return font;
        };
        if font.tables[head_idx].data.len() < HEAD_ADJUSTMENT.end {
            return font;
        }

        font.tables[head_idx].data[HEAD_ADJUSTMENT].fill(0);
        let total = checksum(&font.layout());
        let adjustment = CHECKSUM_MAGIC.wrapping_sub(total);
        font.tables[head_idx].data[HEAD_ADJUSTMENT].copy_from_slice(&adjustment.to_be_bytes());
        font
    }

    /// Serialise as a plain `.ttf` / `.otf` file.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.finalized().layout()
    }

    fn layout(&self) -> Vec<u8> {
        let num_tables = self.tables.len();
        let mut out = Vec::with_capacity(self.sfnt_size());

        out.extend_from_slice(&self.flavor.to_be_bytes());
        let (search_range, entry_selector, range_shift) = search_params(num_tables);
        push_u16(&mut out, num_tables as u16);
        push_u16(&mut out, search_range);
        push_u16(&mut out, entry_selector);
        push_u16(&mut out, range_shift);

        let mut offset = SFNT_HEADER_LEN + SFNT_RECORD_LEN * num_tables;
        for table in &self.tables {
            out.extend_from_slice(&table.tag);
            push_u32(&mut out, table_checksum(table));
            push_u32(&mut out, offset as u32);
            push_u32(&mut out, table.data.len() as u32);
            offset += padded_len(table.data.len());
        }

        for table in &self.tables {
            out.extend_from_slice(&table.data);
            pad4(&mut out);
        }
        out
    }
}

/// Table checksum; `head` is summed with its adjustment field zeroed.
pub fn table_checksum(table: &Table) -> u32 {
    if table.tag == HEAD_TAG && table.data.len() >= HEAD_ADJUSTMENT.end {
        let mut data = table.data.clone();
        data[HEAD_ADJUSTMENT].fill(0);
        checksum(&data)
    } else {
        checksum(&table.data)
    }
}

pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

fn search_params(num_tables: usize) -> (u16, u16, u16) {
    let mut entry_selector = 0u16;
    while (2usize << entry_selector) <= num_tables {
        entry_selector += 1;
    }
    let search_range = (1u16 << entry_selector) * SFNT_RECORD_LEN as u16;
    let range_shift = (num_tables as u16 * SFNT_RECORD_LEN as u16).saturating_sub(search_range);
    (search_range, entry_selector, range_shift)
}

pub fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

pub fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

pub fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

pub fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

pub fn slice(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| anyhow::anyhow!("range {offset}+{len} exceeds font size {}", bytes.len()))
}

pub fn read_u16(bytes: &[u8], offset: usize) -> Result<u16> {
    let b = slice(bytes, offset, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

pub fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    let b = slice(bytes, offset, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

pub fn read_tag(bytes: &[u8], offset: usize) -> Result<[u8; 4]> {
    let b = slice(bytes, offset, 4)?;
    Ok([b[0], b[1], b[2], b[3]])
}
