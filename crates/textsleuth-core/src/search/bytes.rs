/// Byte scanner: does a file contain a pattern?
///
/// Files are streamed in fixed-size windows so memory use is bounded by
/// `window + len(pattern) - 1` regardless of file size. The last
/// `len(pattern) - 1` bytes of each window are carried to the front of the
/// buffer before the next read, so a match straddling two windows is seen
/// whole without re-reading anything.
use crate::config::DEFAULT_WINDOW_SIZE;
use crate::search::cancel::CancelToken;
use crate::search::pattern::Pattern;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Test `path` for `pattern` using the default window size.
pub fn contains_pattern(pattern: &Pattern, path: &Path) -> io::Result<bool> {
    contains_pattern_windowed(pattern, path, DEFAULT_WINDOW_SIZE, &CancelToken::new())
}

/// Test `path` for `pattern`, reading `window` bytes at a time.
///
/// Returns `Ok(false)` without finishing the file if `cancel` fires between
/// windows.
pub fn contains_pattern_windowed(
    pattern: &Pattern,
    path: &Path,
    window: usize,
    cancel: &CancelToken,
) -> io::Result<bool> {
    let file = File::open(path)?;
    contains_in_reader(pattern, file, window, cancel)
}

/// Streaming containment test over any reader.
pub fn contains_in_reader<R: Read>(
    pattern: &Pattern,
    mut reader: R,
    window: usize,
    cancel: &CancelToken,
) -> io::Result<bool> {
    let window = window.max(1);
    let carry = pattern.len() - 1;
    let mut buf = vec![0u8; carry + window];
    // Bytes at the front of `buf` carried over from the previous window.
    let mut kept = 0usize;

    loop {
        if cancel.is_cancelled() {
            return Ok(false);
        }

        let read = read_full(&mut reader, &mut buf[kept..kept + window])?;
        if read == 0 {
            return Ok(false);
        }
        let filled = kept + read;

        if pattern.find_in(&buf[..filled]).is_some() {
            return Ok(true);
        }

        // Short read means end of file.
        if read < window {
            return Ok(false);
        }

        kept = carry.min(filled);
        buf.copy_within(filled - kept..filled, 0);
    }
}

/// Fill `buf` as far as the reader allows. Returns the bytes read; fewer
/// than `buf.len()` only at end of input.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}
