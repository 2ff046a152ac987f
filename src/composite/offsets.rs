//! Reading and validating offset tables.
//!
//! Containers and sequences of variable-size elements store a 4-byte little-endian offset in
//! their fixed region for every variable-size part. The helpers here turn an encoding into
//! per-part slices, rejecting tables that are out of bounds or not monotonic.

use crate::{BYTES_PER_LENGTH_OFFSET, SSZError};
use alloc::vec::Vec;

/// Reads the offset stored at `position`.
pub fn read_offset(data: &[u8], position: usize) -> Result<usize, SSZError> {
    let end = position + BYTES_PER_LENGTH_OFFSET;
    let bytes: [u8; BYTES_PER_LENGTH_OFFSET] = data
        .get(position..end)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(SSZError::InvalidLength {
            expected: end,
            got: data.len(),
        })?;
    Ok(u32::from_le_bytes(bytes) as usize)
}

/// Writes `offset` as a 4-byte little-endian integer.
pub fn write_offset(buffer: &mut Vec<u8>, offset: usize) -> Result<(), SSZError> {
    let offset = u32::try_from(offset).map_err(|_| SSZError::TotalLengthOverflow {
        len: offset as u64,
    })?;
    buffer.extend_from_slice(&offset.to_le_bytes());
    Ok(())
}

/// Checks that `offsets` are in bounds and non-decreasing, then slices out each variable part.
fn slice_variable_parts<'a>(data: &'a [u8], offsets: &[usize]) -> Result<Vec<&'a [u8]>, SSZError> {
    let mut parts = Vec::with_capacity(offsets.len());
    for (i, &start) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(data.len());
        if end > data.len() {
            tracing::debug!(offset = end, len = data.len(), "offset out of bounds");
            return Err(SSZError::OffsetOutOfBounds {
                offset: end,
                len: data.len(),
            });
        }
        if start > end {
            tracing::debug!(start, end, "offsets are not monotonic");
            return Err(SSZError::InvalidOffsetRange { start, end });
        }
        parts.push(&data[start..end]);
    }
    Ok(parts)
}

/// Splits a container encoding into one slice per field.
///
/// `layout` holds, per field in declaration order, `Some(size)` for a fixed-size field or
/// `None` for a variable-size field.
pub fn split_container<'a>(
    data: &'a [u8],
    layout: &[Option<usize>],
) -> Result<Vec<&'a [u8]>, SSZError> {
    let fixed_len: usize = layout
        .iter()
        .map(|size| size.unwrap_or(BYTES_PER_LENGTH_OFFSET))
        .sum();
    if data.len() < fixed_len {
        tracing::debug!(expected = fixed_len, got = data.len(), "container fixed region truncated");
        return Err(SSZError::InvalidLength {
            expected: fixed_len,
            got: data.len(),
        });
    }

    let mut fixed_parts = Vec::with_capacity(layout.len());
    let mut offsets = Vec::new();
    let mut position = 0;
    for size in layout {
        match size {
            Some(size) => {
                fixed_parts.push(Some(&data[position..position + size]));
                position += size;
            }
            None => {
                offsets.push(read_offset(data, position)?);
                fixed_parts.push(None);
                position += BYTES_PER_LENGTH_OFFSET;
            }
        }
    }

    match offsets.first() {
        None if data.len() != fixed_len => {
            tracing::debug!(expected = fixed_len, got = data.len(), "trailing bytes after container");
            return Err(SSZError::InvalidLength {
                expected: fixed_len,
                got: data.len(),
            });
        }
        Some(&first) if first != fixed_len => {
            tracing::debug!(offset = first, expected = fixed_len, "first offset does not close fixed region");
            return Err(SSZError::UnexpectedFirstOffset {
                offset: first,
                expected: fixed_len,
            });
        }
        _ => {}
    }

    let mut variable_parts = slice_variable_parts(data, &offsets)?.into_iter();
    let mut fields = Vec::with_capacity(layout.len());
    for part in fixed_parts {
        match part {
            Some(bytes) => fields.push(bytes),
            None => fields.extend(variable_parts.next()),
        }
    }
    Ok(fields)
}

/// Splits an encoding of variable-size elements into one slice per element.
///
/// The element count is recovered from the first offset. `expected_count` pins it for vectors;
/// `limit` bounds it for lists.
pub fn split_variable_sequence(
    data: &[u8],
    expected_count: Option<usize>,
    limit: Option<usize>,
) -> Result<Vec<&[u8]>, SSZError> {
    if data.is_empty() {
        return match expected_count {
            Some(count) if count > 0 => Err(SSZError::InvalidLength {
                expected: count.saturating_mul(BYTES_PER_LENGTH_OFFSET),
                got: 0,
            }),
            _ => Ok(Vec::new()),
        };
    }

    let first = read_offset(data, 0)?;
    if first == 0 || first % BYTES_PER_LENGTH_OFFSET != 0 || first > data.len() {
        tracing::debug!(offset = first, len = data.len(), "invalid first offset");
        return Err(SSZError::InvalidFirstOffset { offset: first });
    }

    let count = first / BYTES_PER_LENGTH_OFFSET;
    if let Some(expected) = expected_count {
        if count != expected {
            return Err(SSZError::InvalidLength {
                expected: expected.saturating_mul(BYTES_PER_LENGTH_OFFSET),
                got: first,
            });
        }
    }
    if let Some(limit) = limit {
        if count > limit {
            tracing::debug!(count, limit, "too many elements");
            return Err(SSZError::LimitExceeded { limit, got: count });
        }
    }

    let offsets = (0..count)
        .map(|i| read_offset(data, i * BYTES_PER_LENGTH_OFFSET))
        .collect::<Result<Vec<_>, _>>()?;
    slice_variable_parts(data, &offsets)
}

/// Splits an encoding of fixed-size elements into one slice per element.
pub fn split_fixed_sequence(
    data: &[u8],
    elem_size: usize,
    expected_count: Option<usize>,
    limit: Option<usize>,
) -> Result<Vec<&[u8]>, SSZError> {
    if let Some(count) = expected_count {
        if Some(data.len()) != count.checked_mul(elem_size) {
            return Err(SSZError::InvalidLength {
                expected: count.saturating_mul(elem_size),
                got: data.len(),
            });
        }
    }
    if elem_size == 0 || data.len() % elem_size != 0 {
        tracing::debug!(elem_size, len = data.len(), "length is not a multiple of element size");
        return Err(SSZError::InvalidLength {
            expected: elem_size,
            got: data.len(),
        });
    }

    let count = data.len() / elem_size;
    if let Some(limit) = limit {
        if count > limit {
            tracing::debug!(count, limit, "too many elements");
            return Err(SSZError::LimitExceeded { limit, got: count });
        }
    }
    Ok(data.chunks_exact(elem_size).collect())
}
