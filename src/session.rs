//! The session event loop.
//!
//! A single thread multiplexes three readiness sources with poll(2):
//! terminal input, pty output, and the resize notification channel. Each
//! ready source gets at most one unit of work per iteration, then the loop
//! blocks again; it consumes no CPU while idle.

use std::io;
use std::os::unix::io::RawFd;

use libc::{POLLERR, POLLHUP, POLLIN, STDIN_FILENO, STDOUT_FILENO};
use thiserror::Error;
use tracing::{debug, info};

use crate::convert::{Converter, LegacyToUnicode, UnicodeToLegacy};
use crate::pty::PtySession;
use crate::sigwinch::ResizeSignal;
use crate::term::{self, TermGuard};

/// Fatal startup failures. Once the loop is running, a failing descriptor
/// is a normal shutdown condition, not an error.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("query terminal attributes: {0}")]
    TerminalAttrs(#[source] io::Error),
    #[error("query window size: {0}")]
    WindowSize(#[source] io::Error),
    #[error("install resize handler: {0}")]
    ResizeHandler(#[source] io::Error),
    #[error("enter raw mode: {0}")]
    RawMode(#[source] io::Error),
    #[error("allocate pty: {0}")]
    Pty(#[from] anyhow::Error),
}

/// Run `argv` inside the translating pty session.
///
/// Returns the process exit code to report: the child's own status when it
/// exited normally, 127 otherwise.
pub fn run(argv: &[String]) -> Result<i32, SetupError> {
    // Declared first so its Drop (attribute restoration) is the very last
    // effect, after the pty is closed and the child reaped.
    let guard = TermGuard::capture().map_err(SetupError::TerminalAttrs)?;
    let (cols, rows) = term::window_size().map_err(SetupError::WindowSize)?;
    let mut resize = ResizeSignal::install().map_err(SetupError::ResizeHandler)?;

    let mut to_child = Converter::new(UnicodeToLegacy);
    let mut from_child = Converter::new(LegacyToUnicode);

    let mut pty = PtySession::spawn(argv, cols, rows)?;
    guard.enter_raw_mode().map_err(SetupError::RawMode)?;
    info!(command = %argv[0], cols, rows, "session started");

    event_loop(&mut pty, &mut resize, &mut to_child, &mut from_child);

    let code = pty.wait();
    info!(code, "session finished");
    Ok(code)
}

fn event_loop(
    pty: &mut PtySession,
    resize: &mut ResizeSignal,
    to_child: &mut Converter<UnicodeToLegacy>,
    from_child: &mut Converter<LegacyToUnicode>,
) {
    let master = pty.master_fd();
    loop {
        let mut fds = [pollfd(STDIN_FILENO), pollfd(master), pollfd(resize.fd())];
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
        if rc < 0 {
            if io::Error::last_os_error().kind() == io::ErrorKind::Interrupted {
                continue;
            }
            break;
        }

        if readable(&fds[0]) {
            match to_child.pump(STDIN_FILENO, master) {
                Ok(n) if n > 0 => {}
                _ => break,
            }
        }

        if readable(&fds[1]) {
            match from_child.pump(master, STDOUT_FILENO) {
                Ok(n) if n > 0 => {}
                _ => break,
            }
        }

        if readable(&fds[2]) {
            resize.drain();
            if let Ok((cols, rows)) = term::window_size() {
                debug!(cols, rows, "window size changed");
                let _ = pty.resize(cols, rows);
            }
        }
    }
}

fn pollfd(fd: RawFd) -> libc::pollfd {
    libc::pollfd {
        fd,
        events: POLLIN,
        revents: 0,
    }
}

// A hangup or error on a watched descriptor must also wake the pump so the
// resulting EOF/error ends the session.
fn readable(fd: &libc::pollfd) -> bool {
    fd.revents & (POLLIN | POLLHUP | POLLERR) != 0
}
