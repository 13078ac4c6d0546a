//! CP437 code page tables.
//!
//! Bytes 0x00-0x7f map straight to ASCII, matching the Unicode reference
//! mapping for the code page; the high half carries the IBM PC box-drawing
//! and block graphics, accented Latin, Greek, and math glyphs.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Replacement byte for scalars CP437 cannot represent.
pub const SUBSTITUTE: u8 = b'?';

#[rustfmt::skip]
const HIGH: [char; 128] = [
    // 0x80
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    // 0xa0
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    // 0xb0
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    // 0xc0
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    // 0xd0
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    // 0xe0
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    // 0xf0
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// Unicode scalar for a CP437 byte. Total: every byte has a mapping.
pub fn decode(byte: u8) -> char {
    if byte < 0x80 {
        byte as char
    } else {
        HIGH[usize::from(byte - 0x80)]
    }
}

/// CP437 byte for a Unicode scalar, if the code page has one.
pub fn encode(ch: char) -> Option<u8> {
    if (ch as u32) < 0x80 {
        return Some(ch as u8);
    }
    static REVERSE: OnceLock<HashMap<char, u8>> = OnceLock::new();
    let reverse = REVERSE.get_or_init(|| {
        HIGH.iter()
            .enumerate()
            .map(|(i, &ch)| (ch, 0x80 + i as u8))
            .collect()
    });
    reverse.get(&ch).copied()
}
