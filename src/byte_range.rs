//! Byte ranges.
//!
//! A [`ByteRange`] is a half-open interval `[begin, end)` of byte offsets into a flattened binary object.
//!
//! Byte ranges are produced by the [decomposition](crate::array::Decomposition) of a region and are passed to a
//! [readable store](crate::storage::ReadableStorageTraits) to retrieve the bytes of contiguous element runs.
//!
//! [`extract_byte_ranges`] is a convenience function for extracting byte ranges from bytes that were retrieved as a
//! single covering range, and [`ByteRange::split`] divides a large range into fixed-size segments for parallel retrieval.

use std::ops::Range;

use thiserror::Error;

use crate::storage::Bytes;

/// A byte offset.
pub type ByteOffset = u64;

/// A byte length.
pub type ByteLength = u64;

/// A byte range `[begin, end)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct ByteRange {
    begin: ByteOffset,
    end: ByteOffset,
}

/// An inverted byte range error.
#[derive(Copy, Clone, Debug, Error)]
#[error("byte range end {1} precedes begin {0}")]
pub struct InvertedByteRangeError(ByteOffset, ByteOffset);

impl ByteRange {
    /// Create a new byte range `[begin, end)`.
    ///
    /// # Errors
    /// Returns [`InvertedByteRangeError`] if `end < begin`.
    pub fn new(begin: ByteOffset, end: ByteOffset) -> Result<Self, InvertedByteRangeError> {
        if end < begin {
            Err(InvertedByteRangeError(begin, end))
        } else {
            Ok(Self { begin, end })
        }
    }

    /// Create a new byte range with a `begin` offset and a `length`.
    #[must_use]
    pub const fn new_with_length(begin: ByteOffset, length: ByteLength) -> Self {
        Self {
            begin,
            end: begin + length,
        }
    }

    /// Return the begin offset (inclusive).
    #[must_use]
    pub const fn begin(&self) -> ByteOffset {
        self.begin
    }

    /// Return the end offset (exclusive).
    #[must_use]
    pub const fn end(&self) -> ByteOffset {
        self.end
    }

    /// Return the length of the byte range.
    #[must_use]
    pub const fn length(&self) -> ByteLength {
        self.end - self.begin
    }

    /// Returns true if the byte range is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Returns true if `other` lies entirely within this byte range.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        other.begin >= self.begin && other.end <= self.end
    }

    /// Return this byte range relative to `origin`, or [`None`] if it begins before `origin`.
    #[must_use]
    pub const fn relative_to(&self, origin: ByteOffset) -> Option<Self> {
        if self.begin < origin {
            None
        } else {
            Some(Self {
                begin: self.begin - origin,
                end: self.end - origin,
            })
        }
    }

    /// Convert the byte range to a [`Range<u64>`].
    #[must_use]
    pub const fn to_range(&self) -> Range<u64> {
        self.begin..self.end
    }

    /// Convert the byte range to a [`Range<usize>`].
    ///
    /// # Errors
    /// Returns an error if the byte range exceeds [`usize::MAX`].
    pub fn to_range_usize(&self) -> Result<Range<usize>, std::num::TryFromIntError> {
        Ok(usize::try_from(self.begin)?..usize::try_from(self.end)?)
    }

    /// Split the byte range into consecutive segments of at most `segment_size` bytes.
    ///
    /// The segments are ordered and their concatenation covers this byte range exactly.
    /// A `segment_size` of zero is treated as one.
    #[must_use]
    pub fn split(&self, segment_size: ByteLength) -> Vec<Self> {
        let segment_size = segment_size.max(1);
        let mut segments = Vec::with_capacity(self.length().div_ceil(segment_size) as usize);
        let mut begin = self.begin;
        while begin < self.end {
            let end = std::cmp::min(begin + segment_size, self.end);
            segments.push(Self { begin, end });
            begin = end;
        }
        segments
    }
}

impl From<Range<u64>> for ByteRange {
    fn from(range: Range<u64>) -> Self {
        Self {
            begin: range.start,
            end: std::cmp::max(range.start, range.end),
        }
    }
}

impl std::fmt::Display for ByteRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}..{}", self.begin, self.end)
    }
}

/// An invalid byte range error.
#[derive(Copy, Clone, Debug, Error)]
#[error("invalid byte range {0} for bytes of length {1}")]
pub struct InvalidByteRangeError(ByteRange, u64);

impl InvalidByteRangeError {
    /// Create a new [`InvalidByteRangeError`].
    #[must_use]
    pub fn new(byte_range: ByteRange, bytes_len: u64) -> Self {
        Self(byte_range, bytes_len)
    }
}

fn validate_byte_ranges(
    byte_ranges: &[ByteRange],
    bytes_len: u64,
) -> Result<(), InvalidByteRangeError> {
    for byte_range in byte_ranges {
        if byte_range.end > bytes_len {
            return Err(InvalidByteRangeError(*byte_range, bytes_len));
        }
    }
    Ok(())
}

/// Extract byte ranges from bytes without copying.
///
/// # Errors
/// Returns [`InvalidByteRangeError`] if any bytes are requested beyond the end of `bytes`.
pub fn extract_byte_ranges(
    bytes: &Bytes,
    byte_ranges: &[ByteRange],
) -> Result<Vec<Bytes>, InvalidByteRangeError> {
    validate_byte_ranges(byte_ranges, bytes.len() as u64)?;
    // Validated against bytes.len(), which is a usize
    #[allow(clippy::cast_possible_truncation)]
    Ok(byte_ranges
        .iter()
        .map(|byte_range| bytes.slice(byte_range.begin as usize..byte_range.end as usize))
        .collect())
}

/// Concatenate ordered byte segments into one buffer.
///
/// Used to reassemble the segments of a [split](ByteRange::split) byte range.
#[must_use]
pub fn concat_byte_segments(segments: Vec<Bytes>) -> Bytes {
    match segments.len() {
        0 => Bytes::new(),
        1 => segments.into_iter().next().unwrap_or_default(),
        _ => {
            let size = segments.iter().map(Bytes::len).sum();
            let mut out = Vec::with_capacity(size);
            for segment in &segments {
                out.extend_from_slice(segment);
            }
            Bytes::from(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_ranges() {
        let byte_range = ByteRange::new(1, 10).unwrap();
        assert_eq!(byte_range.to_range(), 1..10);
        assert_eq!(byte_range.length(), 9);
        assert_eq!(byte_range.to_range_usize().unwrap(), 1..10);
        assert!(ByteRange::new(10, 1).is_err());
        assert_eq!(ByteRange::new_with_length(32, 32), ByteRange::new(32, 64).unwrap());
        assert_eq!(ByteRange::from(5..3), ByteRange::new(5, 5).unwrap());
        assert!(ByteRange::from(5..3).is_empty());

        let outer = ByteRange::new(32, 96).unwrap();
        assert!(outer.contains(&ByteRange::new(64, 96).unwrap()));
        assert!(!outer.contains(&ByteRange::new(64, 97).unwrap()));
        assert_eq!(
            ByteRange::new(64, 96).unwrap().relative_to(32),
            Some(ByteRange::new(32, 64).unwrap())
        );
        assert_eq!(ByteRange::new(0, 8).unwrap().relative_to(32), None);
    }

    #[test]
    fn byte_range_display() {
        assert_eq!(format!("{}", ByteRange::new(0, 0).unwrap()), "0..0");
        assert_eq!(format!("{}", ByteRange::new(32, 64).unwrap()), "32..64");
    }

    #[test]
    fn byte_range_split() {
        let byte_range = ByteRange::new(10, 35).unwrap();
        let segments = byte_range.split(10);
        assert_eq!(
            segments,
            vec![
                ByteRange::new(10, 20).unwrap(),
                ByteRange::new(20, 30).unwrap(),
                ByteRange::new(30, 35).unwrap(),
            ]
        );
        assert_eq!(byte_range.split(100), vec![byte_range]);
        assert!(ByteRange::new(4, 4).unwrap().split(10).is_empty());
        assert_eq!(ByteRange::new(0, 3).unwrap().split(0).len(), 3);
    }

    #[test]
    fn byte_range_extract() {
        let bytes = Bytes::from(vec![1u8, 2, 3, 4, 5]);
        let extracted = extract_byte_ranges(
            &bytes,
            &[ByteRange::new(1, 3).unwrap(), ByteRange::new(4, 5).unwrap()],
        )
        .unwrap();
        assert_eq!(extracted, vec![Bytes::from(vec![2u8, 3]), Bytes::from(vec![5u8])]);

        let err = extract_byte_ranges(&bytes, &[ByteRange::new(1, 6).unwrap()]).unwrap_err();
        assert_eq!(err.to_string(), "invalid byte range 1..6 for bytes of length 5");
    }

    #[test]
    fn byte_range_concat() {
        let segments = vec![Bytes::from(vec![1u8, 2]), Bytes::from(vec![3u8]), Bytes::new()];
        assert_eq!(concat_byte_segments(segments), Bytes::from(vec![1u8, 2, 3]));
        assert!(concat_byte_segments(vec![]).is_empty());
    }
}
