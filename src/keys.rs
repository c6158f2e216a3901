use std::fs::File;
use std::io::{BufRead, BufReader, Error, ErrorKind, Result};
use std::path::Path;

/// Trait abstracting the key set a table is built from.
///
/// Keys are addressed by index `0..len()` and must not change while a build
/// is in progress; the builder takes no snapshot of its own. Implementations
/// are expected to be cheap to index repeatedly, since the two-pass build
/// visits every key several times.
pub trait PerfMapKeys {
    /// Number of keys in the set.
    fn len(&self) -> usize;

    /// Returns the bytes of the key at `index`.
    ///
    /// Implementations may panic when `index >= len()`.
    fn key(&self, index: usize) -> &[u8];

    /// Returns `true` when the set holds no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: AsRef<[u8]>> PerfMapKeys for [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn key(&self, index: usize) -> &[u8] {
        self[index].as_ref()
    }
}

/// Owned set of fixed-size key records backed by one contiguous buffer.
///
/// This is the ingestion side of the crate: a line-delimited identifier file
/// (one key per line, every line exactly `record_len` bytes) is loaded into
/// a flat record array whose indices the built table later resolves to.
///
/// # Examples
///
/// ```
/// use perfmap::{FixedKeys, PerfMapKeys};
///
/// # fn main() -> std::io::Result<()> {
/// let input = "US0378331005\nDE000BAY0017\n";
/// let keys = FixedKeys::from_lines(input.as_bytes(), 12)?;
/// assert_eq!(keys.len(), 2);
/// assert_eq!(keys.key(1), b"DE000BAY0017");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FixedKeys {
    record_len: usize,
    data: Vec<u8>,
}

impl FixedKeys {
    /// Creates an empty set of `record_len`-byte keys.
    ///
    /// # Panics
    ///
    /// Panics if `record_len` is zero.
    pub fn new(record_len: usize) -> Self {
        assert!(record_len > 0, "record_len must be positive");
        Self {
            record_len,
            data: Vec::new(),
        }
    }

    /// Appends one key record.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::InvalidInput` when `key` is not exactly
    /// `record_len` bytes long.
    pub fn push(&mut self, key: &[u8]) -> Result<()> {
        if key.len() != self.record_len {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "key length {} does not match record length {}",
                    key.len(),
                    self.record_len
                ),
            ));
        }
        self.data.extend_from_slice(key);
        Ok(())
    }

    /// Reads a line-delimited key source, one `record_len`-byte key per line.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::InvalidData` for any line whose length differs
    /// from `record_len`, and forwards IO errors from the reader.
    pub fn from_lines<R: BufRead>(reader: R, record_len: usize) -> Result<Self> {
        let mut keys = Self::new(record_len);
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            keys.push(line.as_bytes()).map_err(|_| {
                Error::new(
                    ErrorKind::InvalidData,
                    format!(
                        "line {}: expected {} bytes, found {}",
                        number + 1,
                        record_len,
                        line.len()
                    ),
                )
            })?;
        }
        Ok(keys)
    }

    /// Opens `path` and delegates to [`from_lines`](Self::from_lines).
    pub fn from_path<P: AsRef<Path>>(path: P, record_len: usize) -> Result<Self> {
        Self::from_lines(BufReader::new(File::open(path)?), record_len)
    }

    /// Length in bytes of every record in this set.
    pub fn record_len(&self) -> usize {
        self.record_len
    }
}

impl PerfMapKeys for FixedKeys {
    fn len(&self) -> usize {
        self.data.len() / self.record_len
    }

    fn key(&self, index: usize) -> &[u8] {
        &self.data[index * self.record_len..(index + 1) * self.record_len]
    }
}
