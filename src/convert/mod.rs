//! The bidirectional character-set conversion engine.

mod cp437;
mod stream;

pub use cp437::{decode, encode, SUBSTITUTE};
pub use stream::{Codec, Converter, LegacyToUnicode, Step, UnicodeToLegacy, BUF_SIZE};
