use std::io::Write;

/// Byte destination. Every method reports whether the bytes were accepted.
pub trait DataSink {
    fn put(&mut self, byte: u8) -> bool;

    /// Writes `bytes` in order, stopping at the first rejected byte.
    fn write(&mut self, bytes: &[u8]) -> bool {
        bytes.iter().all(|byte| self.put(*byte))
    }

    fn flush(&mut self) -> bool {
        true
    }
}

impl<S: DataSink + ?Sized> DataSink for &mut S {
    fn put(&mut self, byte: u8) -> bool {
        (**self).put(byte)
    }

    fn write(&mut self, bytes: &[u8]) -> bool {
        (**self).write(bytes)
    }

    fn flush(&mut self) -> bool {
        (**self).flush()
    }
}

impl<S: DataSink + ?Sized> DataSink for Box<S> {
    fn put(&mut self, byte: u8) -> bool {
        (**self).put(byte)
    }

    fn write(&mut self, bytes: &[u8]) -> bool {
        (**self).write(bytes)
    }

    fn flush(&mut self) -> bool {
        (**self).flush()
    }
}

/// Collects everything written into memory.
#[derive(Debug, Default, Clone)]
pub struct StringDataSink {
    bytes: Vec<u8>,
}

impl StringDataSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected text; invalid UTF-8 sequences are replaced.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_string(self) -> String {
        match String::from_utf8(self.bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

impl DataSink for StringDataSink {
    fn put(&mut self, byte: u8) -> bool {
        self.bytes.push(byte);
        true
    }

    fn write(&mut self, bytes: &[u8]) -> bool {
        self.bytes.extend_from_slice(bytes);
        true
    }
}

/// Adapts any [`std::io::Write`]; I/O errors become rejections.
#[derive(Debug)]
pub struct IoDataSink<W: Write> {
    inner: W,
    last_error: Option<std::io::Error>,
}

impl<W: Write> IoDataSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            last_error: None,
        }
    }

    /// The error behind the most recent rejection, if any.
    pub fn take_error(&mut self) -> Option<std::io::Error> {
        self.last_error.take()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn record(&mut self, result: std::io::Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "io sink rejected write");
                self.last_error = Some(err);
                false
            }
        }
    }
}

impl<W: Write> DataSink for IoDataSink<W> {
    fn put(&mut self, byte: u8) -> bool {
        let result = self.inner.write_all(&[byte]);
        self.record(result)
    }

    fn write(&mut self, bytes: &[u8]) -> bool {
        let result = self.inner.write_all(bytes);
        self.record(result)
    }

    fn flush(&mut self) -> bool {
        let result = self.inner.flush();
        self.record(result)
    }
}
