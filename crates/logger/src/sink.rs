//! Destinations for formatted records

use std::io::{self, Write};
use std::sync::Arc;

use flogging_file::RotatingWriter;

/// Destination for formatted log lines
///
/// Each call to [`write`](LogSink::write) carries one complete formatted record, so
/// implementations must not interleave concurrent calls.
pub trait LogSink: Send + Sync + 'static {
    /// Write one formatted record
    fn write(&self, buf: &[u8]) -> io::Result<usize>;

    /// Push buffered output towards its destination
    fn sync(&self) -> io::Result<()>;
}

impl LogSink for RotatingWriter {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        Self::write(self, buf)
    }

    fn sync(&self) -> io::Result<()> {
        Self::sync(self).map_err(io::Error::other)
    }
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn sync(&self) -> io::Result<()> {
        (**self).sync()
    }
}

/// Sink writing to standard output
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().lock().write_all(buf)?;
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

/// Sink writing to standard error
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().lock().write_all(buf)?;
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        io::stderr().lock().flush()
    }
}
