// src/exec/sink.rs

//! Turns a raw byte stream into one log record per line.
//!
//! A [`LineSink`] is fed arbitrary chunks through [`std::io::Write`]. Every
//! newline completes a line, which is cleaned (ANSI escapes removed,
//! surrounding whitespace trimmed) and emitted as a `tracing` event at the
//! sink's level through the sink's own [`Dispatch`]. Bytes after the last
//! newline wait for the next chunk or for [`Write::flush`].

use std::io::{self, Write};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{Dispatch, Level};

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid ANSI regex"));

/// Which child pipe a sink is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn as_str(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }

    /// Level used for lines read from this stream.
    pub fn level(self) -> Level {
        match self {
            Stream::Stdout => Level::INFO,
            Stream::Stderr => Level::ERROR,
        }
    }
}

/// Per-stream line buffer for a single invocation.
pub struct LineSink {
    dispatch: Dispatch,
    stream: Stream,
    level: Level,
    buf: Vec<u8>,
}

impl LineSink {
    pub fn new(dispatch: Dispatch, stream: Stream) -> Self {
        Self::with_level(dispatch, stream, stream.level())
    }

    pub fn with_level(dispatch: Dispatch, stream: Stream, level: Level) -> Self {
        Self {
            dispatch,
            stream,
            level,
            buf: Vec::new(),
        }
    }

    pub fn stream(&self) -> Stream {
        self.stream
    }

    /// Bytes received after the last newline.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    fn emit_buffered(&mut self) {
        let raw = String::from_utf8_lossy(&self.buf);
        if let Some(line) = clean_line(&raw) {
            self.emit(&line);
        }
        self.buf.clear();
    }

    fn emit(&self, line: &str) {
        let stream = self.stream.as_str();
        tracing::dispatcher::with_default(&self.dispatch, || match self.level {
            Level::ERROR => tracing::error!(stream, "{line}"),
            Level::WARN => tracing::warn!(stream, "{line}"),
            Level::INFO => tracing::info!(stream, "{line}"),
            Level::DEBUG => tracing::debug!(stream, "{line}"),
            _ => tracing::trace!(stream, "{line}"),
        });
    }
}

impl Write for LineSink {
    fn write(&mut self, mut chunk: &[u8]) -> io::Result<usize> {
        let total = chunk.len();
        while let Some(idx) = chunk.iter().position(|&b| b == b'\n') {
            self.buf.extend_from_slice(&chunk[..idx]);
            self.emit_buffered();
            chunk = &chunk[idx + 1..];
        }
        self.buf.extend_from_slice(chunk);
        Ok(total)
    }

    /// Emit whatever is left as a final line. Flushing an empty sink does
    /// nothing, so calling this more than once is harmless.
    fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            self.emit_buffered();
        }
        Ok(())
    }
}

/// Strip ANSI escapes and surrounding whitespace; `None` if nothing is left.
pub fn clean_line(raw: &str) -> Option<String> {
    let stripped = ANSI_ESCAPE.replace_all(raw, "");
    let line = stripped.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silent(stream: Stream) -> LineSink {
        LineSink::new(Dispatch::none(), stream)
    }

    #[test]
    fn clean_line_strips_color_codes() {
        assert_eq!(clean_line("\x1b[31mred\x1b[0m").as_deref(), Some("red"));
        assert_eq!(
            clean_line("\x1b[1;32m[100%]\x1b[m done").as_deref(),
            Some("[100%] done")
        );
    }

    #[test]
    fn clean_line_drops_blank_lines() {
        assert_eq!(clean_line("   \t\r"), None);
        assert_eq!(clean_line("\x1b[0m  "), None);
        assert_eq!(clean_line("  ninja: build  \r").as_deref(), Some("ninja: build"));
    }

    #[test]
    fn partial_line_stays_pending_until_newline() -> io::Result<()> {
        let mut sink = silent(Stream::Stdout);
        sink.write_all(b"abc\nde")?;
        assert_eq!(sink.pending(), b"de");
        sink.write_all(b"f")?;
        assert_eq!(sink.pending(), b"def");
        sink.write_all(b"\n")?;
        assert!(sink.pending().is_empty());
        Ok(())
    }

    #[test]
    fn write_reports_whole_chunk_consumed() -> io::Result<()> {
        let mut sink = silent(Stream::Stderr);
        assert_eq!(sink.write(b"one\ntwo\nthr")?, 11);
        assert_eq!(sink.pending(), b"thr");
        Ok(())
    }

    #[test]
    fn flush_clears_buffer_and_is_idempotent() -> io::Result<()> {
        let mut sink = silent(Stream::Stdout);
        sink.write_all(b"tail")?;
        sink.flush()?;
        assert!(sink.pending().is_empty());
        sink.flush()?;
        assert!(sink.pending().is_empty());
        Ok(())
    }

    #[test]
    fn streams_map_to_levels() {
        assert_eq!(Stream::Stdout.level(), Level::INFO);
        assert_eq!(Stream::Stderr.level(), Level::ERROR);
        assert_eq!(silent(Stream::Stderr).stream().as_str(), "stderr");
    }
}
