//! HTTP `Range` header parsing for partial-content streaming.
//!
//! Only single `bytes=` ranges are supported; multipart byteranges are
//! rejected as unsatisfiable rather than served whole.

use crate::error::AppError;

/// A byte range as requested, before the object size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=start-end`, both inclusive.
    Bounded { start: u64, end: u64 },
    /// `bytes=start-`
    From { start: u64 },
    /// `bytes=-len`, the last `len` bytes.
    Suffix { len: u64 },
}

/// A range resolved against an object size; `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
}

impl ResolvedRange {
    /// Number of bytes covered.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false; a resolved range covers at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Value for an S3 `Range` request parameter.
    pub fn to_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

impl ByteRange {
    /// Parse a `Range` header value.
    pub fn parse(header: &str) -> Result<Self, AppError> {
        let invalid = || AppError::range_not_satisfiable(format!("Unsupported range '{header}'"));
        let ranges = header.trim().strip_prefix("bytes=").ok_or_else(invalid)?;
        if ranges.contains(',') {
            return Err(invalid());
        }
        let (start, end) = ranges.split_once('-').ok_or_else(invalid)?;
        let (start, end) = (start.trim(), end.trim());
        match (start.is_empty(), end.is_empty()) {
            (true, false) => {
                let len = end.parse().map_err(|_| invalid())?;
                Ok(Self::Suffix { len })
            }
            (false, true) => {
                let start = start.parse().map_err(|_| invalid())?;
                Ok(Self::From { start })
            }
            (false, false) => {
                let start = start.parse().map_err(|_| invalid())?;
                let end = end.parse().map_err(|_| invalid())?;
                if end < start {
                    return Err(invalid());
                }
                Ok(Self::Bounded { start, end })
            }
            (true, true) => Err(invalid()),
        }
    }

    /// Clamp the range to an object of `total` bytes.
    pub fn resolve(&self, total: u64) -> Result<ResolvedRange, AppError> {
        let unsatisfiable =
            || AppError::range_not_satisfiable(format!("Range not satisfiable for {total} bytes"));
        if total == 0 {
            return Err(unsatisfiable());
        }
        let last = total - 1;
        match *self {
            Self::Bounded { start, end } if start <= last => Ok(ResolvedRange {
                start,
                end: end.min(last),
            }),
            Self::From { start } if start <= last => Ok(ResolvedRange { start, end: last }),
            Self::Suffix { len } if len > 0 => Ok(ResolvedRange {
                start: total.saturating_sub(len),
                end: last,
            }),
            _ => Err(unsatisfiable()),
        }
    }
}
