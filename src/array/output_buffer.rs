use std::sync::atomic::{AtomicUsize, Ordering};

use crate::byte_range::ByteRange;

use super::{ReadError, UnsafeCellSlice};

/// The output of a read, populated by one or more writers before it is handed to the caller.
///
/// The buffer is allocated up front and released when dropped, including when a read fails part way.
/// Bytes written are counted, so an output that is not fully populated is never handed out.
pub(crate) struct OutputBuffer {
    bytes: Vec<u8>,
    size: usize,
    written: AtomicUsize,
}

/// A shared handle for writing disjoint byte ranges of an [`OutputBuffer`].
#[derive(Copy, Clone)]
pub(crate) struct OutputWriter<'a> {
    bytes: UnsafeCellSlice<'a, u8>,
    size: usize,
    written: &'a AtomicUsize,
}

impl OutputBuffer {
    /// Allocate an output buffer of `size` bytes.
    ///
    /// # Errors
    /// Returns [`ReadError::ConcurrencyResource`] if the allocation fails.
    pub(crate) fn new(size: usize) -> Result<Self, ReadError> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(size).map_err(|err| {
            ReadError::ConcurrencyResource(format!(
                "failed to allocate an output buffer of {size} bytes: {err}"
            ))
        })?;
        log::trace!("allocated output buffer of {size} bytes");
        Ok(Self {
            bytes,
            size,
            written: AtomicUsize::new(0),
        })
    }

    /// Returns a writer for this buffer.
    ///
    /// The writer can be shared across threads.
    pub(crate) fn writer(&mut self) -> OutputWriter<'_> {
        OutputWriter {
            bytes: UnsafeCellSlice::new_from_vec_with_spare_capacity(&mut self.bytes),
            size: self.size,
            written: &self.written,
        }
    }

    /// Hand the populated buffer to the caller.
    ///
    /// # Errors
    /// Returns [`ReadError::IncompleteOutput`] if the number of bytes written does not match the buffer size.
    pub(crate) fn finish(mut self) -> Result<Vec<u8>, ReadError> {
        let written = self.written.load(Ordering::Acquire);
        if written != self.size {
            return Err(ReadError::IncompleteOutput(written, self.size));
        }
        // SAFETY: every byte in 0..size has been written exactly once by an `OutputWriter`
        unsafe { self.bytes.set_len(self.size) };
        Ok(std::mem::take(&mut self.bytes))
    }
}

impl Drop for OutputBuffer {
    fn drop(&mut self) {
        if self.bytes.capacity() > 0 {
            log::trace!("released output buffer of {} bytes", self.size);
        }
    }
}

impl OutputWriter<'_> {
    /// Write `bytes` to `output_byte_range` of the output.
    ///
    /// # Errors
    /// Returns [`ReadError::InvalidBytesLength`] if the length of `bytes` does not match `output_byte_range`, or the range extends beyond the output.
    ///
    /// # Safety
    /// Concurrent writes must be to disjoint byte ranges, and each byte of the output must be written at most once.
    pub(crate) unsafe fn write(
        &self,
        output_byte_range: &ByteRange,
        bytes: &[u8],
    ) -> Result<(), ReadError> {
        if output_byte_range.length() != bytes.len() as u64 {
            return Err(ReadError::InvalidBytesLength(
                bytes.len() as u64,
                output_byte_range.length(),
            ));
        }
        let range = output_byte_range
            .to_range_usize()
            .ok()
            .filter(|range| range.end <= self.size)
            .ok_or(ReadError::InvalidBytesLength(
                output_byte_range.end(),
                self.size as u64,
            ))?;
        self.bytes.index_mut(range).copy_from_slice(bytes);
        self.written.fetch_add(bytes.len(), Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_buffer_complete() -> Result<(), Box<dyn std::error::Error>> {
        let mut output = OutputBuffer::new(6)?;
        {
            let writer = output.writer();
            unsafe {
                writer.write(&ByteRange::new(3, 6)?, &[4, 5, 6])?;
                writer.write(&ByteRange::new(0, 3)?, &[1, 2, 3])?;
            }
        }
        assert_eq!(output.finish()?, vec![1, 2, 3, 4, 5, 6]);
        Ok(())
    }

    #[test]
    fn output_buffer_incomplete() -> Result<(), Box<dyn std::error::Error>> {
        let mut output = OutputBuffer::new(6)?;
        {
            let writer = output.writer();
            unsafe { writer.write(&ByteRange::new(0, 3)?, &[1, 2, 3])? };
        }
        assert!(matches!(
            output.finish(),
            Err(ReadError::IncompleteOutput(3, 6))
        ));
        Ok(())
    }

    #[test]
    fn output_buffer_invalid_write() -> Result<(), Box<dyn std::error::Error>> {
        let mut output = OutputBuffer::new(4)?;
        let writer = output.writer();
        assert!(unsafe { writer.write(&ByteRange::new(0, 2)?, &[1]) }.is_err());
        assert!(unsafe { writer.write(&ByteRange::new(3, 5)?, &[1, 2]) }.is_err());
        Ok(())
    }

    #[test]
    fn output_buffer_allocation_failure() {
        assert!(matches!(
            OutputBuffer::new(usize::MAX),
            Err(ReadError::ConcurrencyResource(_))
        ));
    }

    #[test]
    fn output_buffer_empty() -> Result<(), Box<dyn std::error::Error>> {
        let output = OutputBuffer::new(0)?;
        assert!(output.finish()?.is_empty());
        Ok(())
    }
}
