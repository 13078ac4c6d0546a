//! Streaming conversion between the terminal's UTF-8 and the child's CP437.
//!
//! Reads arrive at arbitrary byte boundaries, so a multi-byte sequence may
//! be split across two reads. Each direction keeps the unconverted tail of
//! the previous read and prepends it to the next one.

use std::io;
use std::os::unix::io::RawFd;
use std::str;

use tracing::debug;

use crate::convert::cp437;

/// Read chunk and residual capacity per direction.
pub const BUF_SIZE: usize = 4096;

/// Outcome of one codec pass over an input span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Everything was converted.
    Complete,
    /// The last `n` bytes form an incomplete multi-byte unit; they were not
    /// converted and need more input.
    Partial(usize),
    /// A byte that cannot appear in any valid unit follows `n` converted
    /// bytes.
    Malformed(usize),
}

/// One direction of the character-set bridge.
pub trait Codec {
    /// Convert a maximal prefix of `input`, appending the result to `out`.
    fn convert(&self, input: &[u8], out: &mut Vec<u8>) -> Step;
}

/// Child output: CP437 bytes to UTF-8.
pub struct LegacyToUnicode;

impl Codec for LegacyToUnicode {
    fn convert(&self, input: &[u8], out: &mut Vec<u8>) -> Step {
        let mut utf8 = [0u8; 4];
        for &byte in input {
            out.extend_from_slice(cp437::decode(byte).encode_utf8(&mut utf8).as_bytes());
        }
        // Single-byte source: every byte maps, nothing is ever held back.
        Step::Complete
    }
}

/// Terminal input: UTF-8 to CP437, substituting scalars the code page lacks.
pub struct UnicodeToLegacy;

impl UnicodeToLegacy {
    fn encode_str(s: &str, out: &mut Vec<u8>) {
        for ch in s.chars() {
            out.push(cp437::encode(ch).unwrap_or(cp437::SUBSTITUTE));
        }
    }
}

impl Codec for UnicodeToLegacy {
    fn convert(&self, input: &[u8], out: &mut Vec<u8>) -> Step {
        match str::from_utf8(input) {
            Ok(s) => {
                Self::encode_str(s, out);
                Step::Complete
            }
            Err(err) => {
                let valid = err.valid_up_to();
                // from_utf8 vouches for the prefix up to `valid`.
                let s = unsafe { str::from_utf8_unchecked(&input[..valid]) };
                Self::encode_str(s, out);
                match err.error_len() {
                    Some(_) => Step::Malformed(valid),
                    None => Step::Partial(input.len() - valid),
                }
            }
        }
    }
}

/// Per-direction conversion state: a codec plus the bytes read but not yet
/// convertible because they end mid-sequence.
pub struct Converter<C> {
    codec: C,
    buf: Box<[u8; BUF_SIZE]>,
    /// Occupied prefix of `buf`. Stays strictly below `BUF_SIZE`: a full
    /// buffer with no progress would wedge the loop.
    len: usize,
}

impl<C: Codec> Converter<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            buf: Box::new([0u8; BUF_SIZE]),
            len: 0,
        }
    }

    /// Bytes currently held over from previous reads.
    pub fn residual(&self) -> usize {
        self.len
    }

    /// One read from `from`, converted and written to `to`.
    ///
    /// Returns the byte count read from `from`: `Ok(0)` means the source
    /// reached end-of-stream and the session should wind down. Converted
    /// bytes are flushed to `to` after every codec pass, so output reaches
    /// the destination as it is produced rather than at the end.
    pub fn pump(&mut self, from: RawFd, to: RawFd) -> io::Result<usize> {
        debug_assert!(self.len < BUF_SIZE);
        let n = read_fd(from, &mut self.buf[self.len..])?;
        if n == 0 {
            return Ok(0);
        }
        self.len += n;

        let mut pos = 0;
        let mut out = Vec::with_capacity(BUF_SIZE);
        let result = loop {
            out.clear();
            let step = self.codec.convert(&self.buf[pos..self.len], &mut out);
            let flushed = if out.is_empty() {
                Ok(())
            } else {
                write_all_fd(to, &out)
            };
            // Converted bytes count as consumed even when the flush fails:
            // re-running the conversion later would re-emit output that may
            // already have reached the destination.
            match step {
                Step::Complete => pos = self.len,
                Step::Partial(tail) => pos = self.len - tail,
                Step::Malformed(converted) => {
                    // Drop exactly one byte and resume. Malformed input must
                    // never stall the stream.
                    debug!(offset = pos + converted, "skipping undecodable byte");
                    pos += converted + 1;
                }
            }
            match flushed {
                Ok(()) if matches!(step, Step::Malformed(_)) => {}
                Ok(()) => break Ok(n),
                Err(err) => break Err(err),
            }
        };

        self.buf.copy_within(pos..self.len, 0);
        self.len -= pos;
        result
    }
}

fn read_fd(fd: RawFd, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n >= 0 {
            return Ok(n as usize);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

fn write_all_fd(fd: RawFd, mut buf: &[u8]) -> io::Result<()> {
    while !buf.is_empty() {
        let n = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };
        match n {
            n if n > 0 => buf = &buf[n as usize..],
            0 => return Err(io::ErrorKind::WriteZero.into()),
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err);
                }
            }
        }
    }
    Ok(())
}
