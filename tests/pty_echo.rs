//! End-to-end scenario: a child that echoes its input verbatim, with CP437
//! bytes crossing both conversion directions through a real pty.

#![cfg(unix)]

use std::io;
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::time::{Duration, Instant};

use cp437::convert::{Converter, LegacyToUnicode, UnicodeToLegacy};
use cp437::pty::PtySession;

fn pipe_pair() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds = [0; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) })
}

fn write_fd(fd: RawFd, bytes: &[u8]) {
    let n = unsafe { libc::write(fd, bytes.as_ptr().cast(), bytes.len()) };
    assert_eq!(n, bytes.len() as isize);
}

fn set_nonblocking(fd: RawFd) {
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK);
    }
}

fn read_pending(fd: RawFd, into: &mut Vec<u8>) {
    let mut buf = [0u8; 256];
    loop {
        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n > 0 {
            into.extend_from_slice(&buf[..n as usize]);
        } else {
            break;
        }
    }
}

/// Pump child output through the CP437-to-UTF-8 direction until `wanted`
/// shows up in the collected stream.
fn pump_until(
    from_child: &mut Converter<LegacyToUnicode>,
    pty: &PtySession,
    dst_r: RawFd,
    dst_w: RawFd,
    collected: &mut Vec<u8>,
    wanted: &[u8],
) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !collected
        .windows(wanted.len().max(1))
        .any(|w| w == wanted)
    {
        assert!(
            Instant::now() < deadline,
            "timed out waiting for {wanted:?}, got {collected:?}"
        );
        let n = from_child.pump(pty.master_fd(), dst_w).expect("pty read");
        assert!(n > 0, "pty closed before {wanted:?} arrived");
        read_pending(dst_r, collected);
    }
}

#[test]
fn echo_child_round_trips_block_shading() {
    // `stty raw -echo` keeps the tty driver from echoing or line-buffering,
    // so each byte crosses exactly once. READY marks the point where the
    // new settings are in effect.
    let argv = vec![
        "sh".to_string(),
        "-c".to_string(),
        "stty raw -echo; printf READY; cat".to_string(),
    ];
    let pty = PtySession::spawn(&argv, 80, 24).unwrap();

    let (src_r, src_w) = pipe_pair().unwrap();
    let (dst_r, dst_w) = pipe_pair().unwrap();
    set_nonblocking(dst_r.as_raw_fd());

    let mut to_child = Converter::new(UnicodeToLegacy);
    let mut from_child = Converter::new(LegacyToUnicode);
    let mut collected = Vec::new();

    pump_until(
        &mut from_child,
        &pty,
        dst_r.as_raw_fd(),
        dst_w.as_raw_fd(),
        &mut collected,
        b"READY",
    );
    collected.clear();

    // Terminal -> child: UTF-8 shading glyphs become CP437 0xb0 0xb1 0xb2.
    write_fd(src_w.as_raw_fd(), "░▒▓".as_bytes());
    let n = to_child
        .pump(src_r.as_raw_fd(), pty.master_fd())
        .expect("write to pty");
    assert_eq!(n, "░▒▓".len());

    // Child -> terminal: cat echoes the legacy bytes, which must come back
    // as the UTF-8 glyphs, not as the raw CP437 bytes.
    pump_until(
        &mut from_child,
        &pty,
        dst_r.as_raw_fd(),
        dst_w.as_raw_fd(),
        &mut collected,
        "░▒▓".as_bytes(),
    );
    assert!(!collected.windows(3).any(|w| w == [0xb0, 0xb1, 0xb2]));

    drop(src_r);
    drop(src_w);
    // PtySession::drop kills and reaps the still-running cat.
}

#[test]
fn resize_is_observable_on_the_pty() {
    let argv = vec!["sleep".to_string(), "5".to_string()];
    let pty = PtySession::spawn(&argv, 80, 24).unwrap();

    pty.resize(132, 50).unwrap();

    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(pty.master_fd(), libc::TIOCGWINSZ, &mut ws) };
    assert_eq!(rc, 0);
    assert_eq!((ws.ws_col, ws.ws_row), (132, 50));
}
