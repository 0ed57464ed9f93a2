use crate::backend::Storage;
use crate::{Result, StorageError};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Access mode of a [`StorageFile`], parsed from framework mode strings such as `"rb"` or `"w+b"`.
///
/// A mode is writable when it contains `w`, `a` or `+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
    ReadWrite,
}

impl FileMode {
    pub fn is_writable(self) -> bool {
        !matches!(self, FileMode::Read)
    }
}

impl From<&str> for FileMode {
    fn from(mode: &str) -> Self {
        if mode.contains('+') {
            FileMode::ReadWrite
        } else if mode.contains('w') || mode.contains('a') {
            FileMode::Write
        } else {
            FileMode::Read
        }
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileMode::Read => "rb",
            FileMode::Write => "wb",
            FileMode::ReadWrite => "r+b",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unopened,
    Reading,
    Writing,
    Closed,
}

/// Lazy handle over one stored file.
///
/// Nothing touches the backend until the first read, which fetches the whole
/// content. Writes replace the in-memory buffer and are pushed to
/// [`Storage::save`] on [`close`](StorageFile::close), and only if something
/// was written.
pub struct StorageFile {
    name: String,
    storage: Arc<dyn Storage>,
    mode: FileMode,
    state: State,
    dirty: bool,
    buffer: Bytes,
    position: usize,
    // Memoized on first call; later writes do not refresh it
    size: Option<Option<u64>>,
}

impl StorageFile {
    pub fn new(name: impl Into<String>, storage: Arc<dyn Storage>, mode: impl Into<FileMode>) -> Self {
        Self {
            name: name.into(),
            storage,
            mode: mode.into(),
            state: State::Unopened,
            dirty: false,
            buffer: Bytes::new(),
            position: 0,
            size: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Reads up to `num_bytes` (everything left when `None`)
    pub async fn read(&mut self, num_bytes: Option<usize>) -> Result<Bytes> {
        self.fill().await?;

        let remaining = self.buffer.len() - self.position;
        let len = num_bytes.map_or(remaining, |n| n.min(remaining));
        let chunk = self.buffer.slice(self.position..self.position + len);
        self.position += len;

        Ok(chunk)
    }

    /// Remaining content split into lines, each keeping its trailing `\n`
    pub async fn readlines(&mut self) -> Result<Vec<Bytes>> {
        self.fill().await?;

        let rest = self.buffer.slice(self.position..);
        self.position = self.buffer.len();

        let mut lines = Vec::new();
        let mut start = 0;
        for (i, byte) in rest.iter().enumerate() {
            if *byte == b'\n' {
                lines.push(rest.slice(start..=i));
                start = i + 1;
            }
        }
        if start < rest.len() {
            lines.push(rest.slice(start..));
        }

        Ok(lines)
    }

    /// Replaces the buffered content. Nothing is sent until `close`.
    pub fn write(&mut self, content: impl Into<Bytes>) -> Result<()> {
        self.ensure_open()?;
        if !self.mode.is_writable() {
            return Err(StorageError::AccessViolation(self.name.clone()));
        }

        self.buffer = content.into();
        self.position = 0;
        self.dirty = true;
        self.state = State::Writing;
        Ok(())
    }

    /// Size reported by the backend, looked up once per handle
    pub async fn size(&mut self) -> Result<Option<u64>> {
        self.ensure_open()?;
        if let Some(size) = self.size {
            return Ok(size);
        }

        let size = self.storage.size(&self.name).await?;
        self.size = Some(size);
        Ok(size)
    }

    /// Saves the buffer if it was written to, then releases it.
    ///
    /// A failed save leaves the handle open and dirty. Closing twice is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        if self.state == State::Closed {
            return Ok(());
        }

        if self.dirty {
            self.storage.save(&self.name, self.buffer.clone()).await?;
            self.dirty = false;
        }

        self.buffer = Bytes::new();
        self.position = 0;
        self.state = State::Closed;
        Ok(())
    }

    async fn fill(&mut self) -> Result<()> {
        match self.state {
            State::Unopened => {
                self.buffer = self.storage.open(&self.name).await?;
                self.position = 0;
                self.state = State::Reading;
                Ok(())
            }
            State::Reading | State::Writing => Ok(()),
            State::Closed => Err(StorageError::FileClosed(self.name.clone())),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == State::Closed {
            return Err(StorageError::FileClosed(self.name.clone()));
        }
        Ok(())
    }
}

impl fmt::Debug for StorageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageFile")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl Drop for StorageFile {
    fn drop(&mut self) {
        if self.dirty && self.state != State::Closed {
            tracing::warn!("File {} dropped with unsaved changes", self.name);
        }
    }
}
