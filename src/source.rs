use std::io::Read;

/// Byte origin with one byte of look-ahead.
pub trait DataSource {
    fn end(&self) -> bool;

    /// Next byte without consuming it.
    fn peek(&mut self) -> Option<u8>;

    fn get(&mut self) -> Option<u8>;

    /// Fills `buf` from the front; returns how many bytes were read.
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        while count < buf.len() {
            match self.get() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// The failure that ended the stream early, if any. Taking it clears it.
    fn take_error(&mut self) -> Option<std::io::Error> {
        None
    }
}

impl<S: DataSource + ?Sized> DataSource for &mut S {
    fn end(&self) -> bool {
        (**self).end()
    }

    fn peek(&mut self) -> Option<u8> {
        (**self).peek()
    }

    fn get(&mut self) -> Option<u8> {
        (**self).get()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        (**self).read(buf)
    }

    fn take_error(&mut self) -> Option<std::io::Error> {
        (**self).take_error()
    }
}

#[derive(Debug, Clone)]
pub struct StringDataSource {
    bytes: Vec<u8>,
    position: usize,
}

impl StringDataSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            bytes: text.into().into_bytes(),
            position: 0,
        }
    }
}

impl DataSource for StringDataSource {
    fn end(&self) -> bool {
        self.position >= self.bytes.len()
    }

    fn peek(&mut self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn get(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.position += 1;
        Some(byte)
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let rest = &self.bytes[self.position.min(self.bytes.len())..];
        let count = rest.len().min(buf.len());
        buf[..count].copy_from_slice(&rest[..count]);
        self.position += count;
        count
    }
}

/// Adapts any [`std::io::Read`] with one byte of look-ahead.
///
/// Nothing is read until the first `peek` or `get`, so `end()` is `false` on a fresh
/// source even when the reader is empty. Read errors end the stream and are kept until
/// [`DataSource::take_error`] collects them.
#[derive(Debug)]
pub struct IoDataSource<R: Read> {
    inner: R,
    lookahead: Option<u8>,
    finished: bool,
    last_error: Option<std::io::Error>,
}

impl<R: Read> IoDataSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lookahead: None,
            finished: false,
            last_error: None,
        }
    }

    fn fill(&mut self) {
        if self.lookahead.is_some() || self.finished {
            return;
        }
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => {
                    self.finished = true;
                    return;
                }
                Ok(_) => {
                    self.lookahead = Some(byte[0]);
                    return;
                }
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    tracing::warn!(%err, "io source failed; stream ends early");
                    self.last_error = Some(err);
                    self.finished = true;
                    return;
                }
            }
        }
    }
}

impl<R: Read> DataSource for IoDataSource<R> {
    fn end(&self) -> bool {
        self.lookahead.is_none() && self.finished
    }

    fn peek(&mut self) -> Option<u8> {
        self.fill();
        self.lookahead
    }

    fn get(&mut self) -> Option<u8> {
        self.fill();
        self.lookahead.take()
    }

    fn take_error(&mut self) -> Option<std::io::Error> {
        self.last_error.take()
    }
}

/// Exposes a [`DataSource`] as [`std::io::Read`]. Bytes read before a source failure are
/// returned first; the failure is reported by the read that would otherwise hit end of input.
pub(crate) struct SourceReader<S: DataSource> {
    pub(crate) source: S,
}

impl<S: DataSource> Read for SourceReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let count = self.source.read(buf);
        if count == 0 && !buf.is_empty() {
            if let Some(err) = self.source.take_error() {
                return Err(err);
            }
        }
        Ok(count)
    }
}
