//! Window-resize notification.
//!
//! The SIGWINCH handler posts one marker byte to a socketpair and does
//! nothing else; only async-signal-safe primitives are allowed in handler
//! context. The event loop owns the read end, drains the markers, and does
//! the actual size query and propagation outside the handler.

use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;

use signal_hook::consts::signal::SIGWINCH;
use signal_hook::low_level::pipe;

pub struct ResizeSignal {
    rx: UnixStream,
}

impl ResizeSignal {
    /// Register the SIGWINCH handler and return the notification channel.
    pub fn install() -> io::Result<Self> {
        let (rx, tx) = UnixStream::pair()?;
        // Nonblocking on both ends: the handler-side write must never
        // block, and a best-effort failed write is fine.
        rx.set_nonblocking(true)?;
        tx.set_nonblocking(true)?;
        pipe::register(SIGWINCH, tx)?;
        Ok(Self { rx })
    }

    /// Read end, for the poll set.
    pub fn fd(&self) -> RawFd {
        self.rx.as_raw_fd()
    }

    /// Consume all pending markers. Rapid notifications coalesce into one
    /// processed event; only the latest window size matters.
    pub fn drain(&mut self) {
        let mut buf = [0u8; 16];
        while matches!(self.rx.read(&mut buf), Ok(n) if n > 0) {}
    }
}
