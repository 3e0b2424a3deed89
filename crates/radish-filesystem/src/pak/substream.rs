//! Read-only view over a byte range of another stream

use std::io::{self, Read, Seek, SeekFrom};

/// Bounded reader over `[start, start + len)` of an inner stream
///
/// Reads stop at the end of the range. Seeking outside the range fails with
/// [`io::ErrorKind::InvalidInput`].
#[derive(Debug)]
pub struct Substream<R> {
    inner: R,
    start: u64,
    len: u64,
    position: u64,
}

impl<R: Read + Seek> Substream<R> {
    /// Create a view over `len` bytes starting at `start`
    pub fn new(mut inner: R, start: u64, len: u64) -> io::Result<Self> {
        if start.checked_add(len).is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "substream range overflows",
            ));
        }
        inner.seek(SeekFrom::Start(start))?;
        Ok(Self {
            inner,
            start,
            len,
            position: 0,
        })
    }

    /// Length of the view
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Check if the view is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes left before the end of the view
    pub fn remaining(&self) -> u64 {
        self.len - self.position
    }

    /// Offset of the view within the inner stream
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Read the rest of the view into a new buffer
    pub fn read_remaining(&mut self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(usize::try_from(self.remaining()).unwrap_or(0));
        self.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Release the view and return the inner stream
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Read for Substream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let max = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let read = self.inner.read(&mut buf[..max])?;
        self.position += read as u64;
        Ok(read)
    }
}

impl<R: Read + Seek> Seek for Substream<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::End(offset) => i128::from(self.len) + i128::from(offset),
            SeekFrom::Current(offset) => i128::from(self.position) + i128::from(offset),
        };

        if target < 0 || target > i128::from(self.len) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to {target} outside substream of length {}", self.len),
            ));
        }

        let target = target as u64;
        self.inner.seek(SeekFrom::Start(self.start + target))?;
        self.position = target;
        Ok(target)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn backing() -> Cursor<Vec<u8>> {
        Cursor::new((0u8..=99).collect())
    }

    #[test]
    fn test_reads_only_range() {
        let mut sub = Substream::new(backing(), 10, 5).unwrap();
        assert_eq!(sub.len(), 5);
        assert_eq!(sub.start(), 10);
        assert_eq!(sub.read_remaining().unwrap(), vec![10, 11, 12, 13, 14]);

        let mut buf = [0u8; 4];
        assert_eq!(sub.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_short_buffer_reads() {
        let mut sub = Substream::new(backing(), 90, 10).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(sub.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, [90, 91, 92, 93]);
        assert_eq!(sub.remaining(), 6);
    }

    #[test]
    fn test_seek_within_range() {
        let mut sub = Substream::new(backing(), 20, 10).unwrap();
        assert_eq!(sub.seek(SeekFrom::Start(3)).unwrap(), 3);
        assert_eq!(sub.seek(SeekFrom::Current(2)).unwrap(), 5);
        assert_eq!(sub.seek(SeekFrom::End(-1)).unwrap(), 9);

        let mut buf = [0u8; 8];
        assert_eq!(sub.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 29);

        assert_eq!(sub.seek(SeekFrom::End(0)).unwrap(), 10);
        assert_eq!(sub.stream_position().unwrap(), 10);
    }

    #[test]
    fn test_seek_outside_range_fails() {
        let mut sub = Substream::new(backing(), 20, 10).unwrap();
        sub.seek(SeekFrom::Start(4)).unwrap();

        let err = sub.seek(SeekFrom::Start(11)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(sub.seek(SeekFrom::Current(-5)).is_err());
        assert!(sub.seek(SeekFrom::End(1)).is_err());

        // Position is unchanged after a rejected seek
        assert_eq!(sub.stream_position().unwrap(), 4);
    }

    #[test]
    fn test_range_overflow() {
        assert!(Substream::new(backing(), u64::MAX, 2).is_err());
    }

    proptest! {
        /// A view never yields bytes from outside its range
        #[test]
        fn substream_stays_in_bounds(start in 0u64..100, len in 0u64..100, seek in 0u64..200) {
            let len = len.min(100 - start);
            let mut sub = Substream::new(backing(), start, len)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;

            let data = sub.read_remaining().map_err(|e| TestCaseError::fail(e.to_string()))?;
            let expected: Vec<u8> = (start..start + len).map(|b| b as u8).collect();
            prop_assert_eq!(data, expected);

            let result = sub.seek(SeekFrom::Start(seek));
            prop_assert_eq!(result.is_ok(), seek <= len);
        }
    }
}
