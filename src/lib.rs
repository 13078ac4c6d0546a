//! Run a CP437 (IBM PC code page) program transparently inside a UTF-8
//! terminal.
//!
//! The binary puts the real terminal into raw mode, executes the target
//! program in a pseudo-terminal, and translates the byte stream in both
//! directions: keyboard input from UTF-8 to CP437, program output from
//! CP437 to UTF-8. Window-size changes are forwarded to the child.

pub mod args;
pub mod convert;
pub mod logging;
pub mod pty;
pub mod session;
pub mod sigwinch;
pub mod term;
