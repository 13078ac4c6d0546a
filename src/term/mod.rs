//! Terminal mode management for the real (outer) terminal.
//!
//! The original attributes are captured exactly once, before anything else
//! touches the terminal. Restoration is tied to the guard's lifetime so it
//! happens on every exit path, including panics while the session runs.

use std::io;
use std::mem;

use libc::{STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO, TCSANOW};

/// Snapshot of the controlling terminal's attributes, restored on drop.
pub struct TermGuard {
    saved: libc::termios,
}

impl TermGuard {
    /// Capture the current attributes from stdin.
    pub fn capture() -> io::Result<Self> {
        let mut saved = unsafe { mem::zeroed::<libc::termios>() };
        if unsafe { libc::tcgetattr(STDIN_FILENO, &mut saved) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { saved })
    }

    /// Switch the terminal to raw mode: no line buffering, no echo, no
    /// signal-generating control characters. The captured snapshot is left
    /// untouched, so restoration works even if this fails partway.
    pub fn enter_raw_mode(&self) -> io::Result<()> {
        let mut raw = self.saved;
        unsafe { libc::cfmakeraw(&mut raw) };
        if unsafe { libc::tcsetattr(STDIN_FILENO, TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        // Restore on every stream that may share the terminal.
        for fd in [STDIN_FILENO, STDOUT_FILENO, STDERR_FILENO] {
            unsafe { libc::tcsetattr(fd, TCSANOW, &self.saved) };
        }
    }
}

/// Current (cols, rows) of the real terminal.
pub fn window_size() -> io::Result<(u16, u16)> {
    crossterm::terminal::size()
}
