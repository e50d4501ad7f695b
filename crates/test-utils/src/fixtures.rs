//! Binary fixtures built in memory.

use assetflow::transform::fonts::sfnt::{Sfnt, Table, CFF_FLAVOR};

/// A structurally valid sfnt (`head`, `name` and an outline table).
///
/// The outline table is `CFF ` for `CFF_FLAVOR` and `glyf` otherwise; its
/// payload is opaque filler since the containers never look inside it.
pub fn sample_font(flavor: u32) -> Vec<u8> {
    let mut head = vec![0u8; 54];
    head[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    head[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
    let name = b"assetflow sample font name table ".repeat(8);
    let outlines = if flavor == CFF_FLAVOR { *b"CFF " } else { *b"glyf" };

    Sfnt::new(
        flavor,
        vec![
            Table { tag: *b"name", data: name },
            Table { tag: *b"head", data: head },
            Table { tag: outlines, data: vec![7u8; 37] },
        ],
    )
    .to_bytes()
}
