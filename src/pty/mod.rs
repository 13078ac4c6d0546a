//! Pseudo-terminal session: allocation, child spawn, resize, reaping.

use std::io;
use std::os::unix::io::RawFd;

use anyhow::{anyhow, Context};
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use tracing::debug;

/// Exit code reported when the child terminated abnormally or cannot be
/// reaped.
pub const ABNORMAL_EXIT: i32 = 127;

pub struct PtySession {
    master: Option<Box<dyn MasterPty + Send>>,
    child: Box<dyn Child + Send + Sync>,
    master_fd: RawFd,
    reaped: bool,
}

impl PtySession {
    /// Allocate a pty at the given size and spawn `argv` on its slave side.
    ///
    /// The child runs under the C locale so it emits CP437 itself instead
    /// of attempting its own translation.
    pub fn spawn(argv: &[String], cols: u16, rows: u16) -> anyhow::Result<Self> {
        let pty_system = native_pty_system();
        let pair = pty_system.openpty(PtySize {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        })?;

        let mut cmd = CommandBuilder::new(&argv[0]);
        cmd.args(&argv[1..]);
        cmd.env("LANG", "C");
        cmd.env("LC_ALL", "C");

        let child = pair.slave.spawn_command(cmd).context("spawn child")?;
        drop(pair.slave);

        let master_fd = pair
            .master
            .as_raw_fd()
            .ok_or_else(|| anyhow!("pty master exposes no file descriptor"))?;

        Ok(Self {
            master: Some(pair.master),
            child,
            master_fd,
            reaped: false,
        })
    }

    /// Master-side descriptor for the poll set.
    pub fn master_fd(&self) -> RawFd {
        self.master_fd
    }

    /// Push a new window size to the child's terminal.
    pub fn resize(&self, cols: u16, rows: u16) -> anyhow::Result<()> {
        match &self.master {
            Some(master) => master.resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            }),
            None => Ok(()),
        }
    }

    /// Close the master and reap the child.
    ///
    /// Returns the child's own exit status when it exited normally,
    /// [`ABNORMAL_EXIT`] when it was killed by a signal.
    pub fn wait(&mut self) -> i32 {
        self.master.take();
        self.reaped = true;
        let Some(pid) = self.child.process_id() else {
            return ABNORMAL_EXIT;
        };
        debug!(pid, "waiting for child");
        wait_status(pid as libc::pid_t)
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

// portable-pty's ExitStatus collapses signal deaths into exit codes, so the
// normal-vs-abnormal distinction comes from waitpid directly.
fn wait_status(pid: libc::pid_t) -> i32 {
    let mut status: libc::c_int = 0;
    loop {
        let rc = unsafe { libc::waitpid(pid, &mut status, 0) };
        if rc >= 0 {
            break;
        }
        if io::Error::last_os_error().kind() != io::ErrorKind::Interrupted {
            return ABNORMAL_EXIT;
        }
    }
    if libc::WIFEXITED(status) {
        libc::WEXITSTATUS(status)
    } else {
        ABNORMAL_EXIT
    }
}
