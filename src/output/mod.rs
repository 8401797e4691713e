//! File and console writers.
//!
//! Thin wrappers over the filesystem and the standard streams. Errors are
//! returned as-is for the caller to surface.

use log::debug;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Standard stream selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Write `contents` to `path`, creating or truncating the file
pub fn write_file(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> io::Result<()> {
    let path = path.as_ref();
    let contents = contents.as_ref();
    debug!("writing {} bytes to {}", contents.len(), path.display());
    fs::write(path, contents)
}

/// Write `text` verbatim to `out` and flush. No newline is added.
pub fn write_to<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    out.flush()
}

/// Write `text` verbatim to the selected stream
pub fn write_stream(stream: Stream, text: &str) -> io::Result<()> {
    match stream {
        Stream::Stdout => write_to(&mut io::stdout().lock(), text),
        Stream::Stderr => write_to(&mut io::stderr().lock(), text),
    }
}

pub fn print_stdout(text: &str) -> io::Result<()> {
    write_stream(Stream::Stdout, text)
}

pub fn print_stderr(text: &str) -> io::Result<()> {
    write_stream(Stream::Stderr, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_to_is_verbatim() {
        let mut out = Vec::new();
        write_to(&mut out, "test stdout").unwrap();
        write_to(&mut out, "").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "test stdout");
    }

    #[test]
    fn test_write_file_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("write_file.tmp");

        write_file(&path, "first").unwrap();
        write_file(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_write_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bytes.bin");
        let bytes = [0u8, 159, 146, 150, 255];

        write_file(&path, bytes).unwrap();

        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_write_file_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("file.txt");

        let err = write_file(&path, "data").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_print_streams() {
        print_stdout("").unwrap();
        print_stderr("").unwrap();
    }
}
