//! Serializes, deserializes and merkleizes containers.
//!
//! A container's encoding is a fixed region followed by a variable region. Fixed-size fields are
//! written in place; every variable-size field leaves a 4-byte offset in the fixed region and
//! appends its bytes to the variable region, in declaration order.

use crate::{
    BYTES_PER_LENGTH_OFFSET, MAX_ENCODED_LENGTH, SSZError, SimpleDeserialize, SimpleSerialize,
    SszTypeInfo,
    composite::offsets::{split_container, write_offset},
    ssz::serialize,
};
use alloc::vec::Vec;

/// A serialized field or element, tagged with where it lives in the encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Bytes written directly into the fixed region.
    Fixed(Vec<u8>),
    /// Bytes written into the variable region, referenced by an offset.
    Variable(Vec<u8>),
}

impl Part {
    /// Serializes `value` and tags it by the size class of `T`.
    pub fn of<T: SimpleSerialize + SszTypeInfo>(value: &T) -> Result<Self, SSZError> {
        let bytes = serialize(value)?;
        Ok(if T::is_fixed_size() {
            Part::Fixed(bytes)
        } else {
            Part::Variable(bytes)
        })
    }

    /// Bytes this part occupies in the fixed region.
    pub fn fixed_len(&self) -> usize {
        match self {
            Part::Fixed(bytes) => bytes.len(),
            Part::Variable(_) => BYTES_PER_LENGTH_OFFSET,
        }
    }

    /// Bytes this part occupies in the variable region.
    pub fn variable_len(&self) -> usize {
        match self {
            Part::Fixed(_) => 0,
            Part::Variable(bytes) => bytes.len(),
        }
    }
}

/// Fails when an encoding of this many bytes cannot be addressed by 4-byte offsets.
pub fn check_total_length(fixed_len: usize, variable_len: usize) -> Result<(), SSZError> {
    let total = fixed_len as u64 + variable_len as u64;
    if total >= MAX_ENCODED_LENGTH {
        tracing::debug!(total, "encoding too large for 4-byte offsets");
        return Err(SSZError::TotalLengthOverflow { len: total });
    }
    Ok(())
}

/// Writes `parts` as a fixed region with substituted offsets followed by the variable region.
pub fn serialize_parts(parts: &[Part], buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
    let fixed_len: usize = parts.iter().map(Part::fixed_len).sum();
    let variable_len: usize = parts.iter().map(Part::variable_len).sum();
    check_total_length(fixed_len, variable_len)?;

    let start = buffer.len();
    buffer.reserve(fixed_len + variable_len);

    let mut offset = fixed_len;
    for part in parts {
        match part {
            Part::Fixed(bytes) => buffer.extend_from_slice(bytes),
            Part::Variable(bytes) => {
                write_offset(buffer, offset)?;
                offset += bytes.len();
            }
        }
    }
    for part in parts {
        if let Part::Variable(bytes) = part {
            buffer.extend_from_slice(bytes);
        }
    }

    Ok(buffer.len() - start)
}

/// Streams container fields into a buffer without collecting them as [`Part`]s first.
pub struct ContainerEncoder<'a> {
    buffer: &'a mut Vec<u8>,
    start: usize,
    offset: usize,
    variable: Vec<u8>,
}

impl<'a> ContainerEncoder<'a> {
    /// Starts a container whose fixed region is `fixed_region_len` bytes long.
    pub fn new(buffer: &'a mut Vec<u8>, fixed_region_len: usize) -> Self {
        let start = buffer.len();
        Self {
            buffer,
            start,
            offset: fixed_region_len,
            variable: Vec::new(),
        }
    }

    /// Writes the next field. On error the buffer is cut back to where the container began.
    pub fn append<T: SimpleSerialize + SszTypeInfo>(&mut self, value: &T) -> Result<(), SSZError> {
        let written = if T::is_fixed_size() {
            value.serialize(self.buffer).map(|_| ())
        } else {
            write_offset(self.buffer, self.offset).and_then(|()| {
                let len = value.serialize(&mut self.variable)?;
                self.offset = self.offset.saturating_add(len);
                Ok(())
            })
        };
        written.inspect_err(|_| self.rewind())
    }

    /// Appends the variable region and returns the number of bytes written.
    pub fn finish(mut self) -> Result<usize, SSZError> {
        let fixed_len = self.buffer.len() - self.start;
        if let Err(err) = check_total_length(fixed_len, self.variable.len()) {
            self.rewind();
            return Err(err);
        }
        self.buffer.extend_from_slice(&self.variable);
        Ok(self.buffer.len() - self.start)
    }

    fn rewind(&mut self) {
        self.buffer.truncate(self.start);
        self.variable.clear();
    }
}

/// Collects the size class of each field before splitting an encoding.
pub struct ContainerDecoderBuilder<'a> {
    data: &'a [u8],
    layout: Vec<Option<usize>>,
}

impl<'a> ContainerDecoderBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            layout: Vec::new(),
        }
    }

    /// Declares the next field to be of type `T`.
    pub fn register_type<T: SszTypeInfo>(&mut self) {
        self.layout.push(T::fixed_size());
    }

    /// Validates the offset table and splits the encoding into per-field slices.
    pub fn build(self) -> Result<ContainerDecoder<'a>, SSZError> {
        let parts = split_container(self.data, &self.layout)?;
        Ok(ContainerDecoder {
            parts: parts.into_iter(),
        })
    }
}

/// Decodes fields in the order they were registered.
pub struct ContainerDecoder<'a> {
    parts: alloc::vec::IntoIter<&'a [u8]>,
}

impl ContainerDecoder<'_> {
    pub fn decode_next<T: SimpleDeserialize>(&mut self) -> Result<T, SSZError> {
        let bytes = self.parts.next().ok_or(SSZError::InvalidLength {
            expected: 1,
            got: 0,
        })?;
        T::deserialize(bytes)
    }
}

/// Bytes `value` contributes to its container: its own size, plus an offset if it is variable.
pub fn field_size<T: SimpleSerialize + SszTypeInfo>(value: &T) -> usize {
    if T::is_fixed_size() {
        value.size_ssz()
    } else {
        BYTES_PER_LENGTH_OFFSET + value.size_ssz()
    }
}

/// Implements the SSZ traits for a struct with named fields.
///
/// Fields are encoded and merkleized in the order they are listed, which must match the
/// declaration order of the container.
///
/// ```ignore
/// pub struct Checkpoint {
///     pub epoch: u64,
///     pub root: B256,
/// }
/// impl_ssz_container!(Checkpoint { epoch: u64, root: B256 });
/// ```
#[macro_export]
macro_rules! impl_ssz_container {
    ($name:ident { $($field:ident : $typ:ty),+ $(,)? }) => {
        impl $crate::SimpleSerialize for $name {
            fn serialize(
                &self,
                buffer: &mut $crate::__private::Vec<u8>,
            ) -> Result<usize, $crate::SSZError> {
                let fixed_region_len = 0 $(
                    + <$typ as $crate::SszTypeInfo>::fixed_size()
                        .unwrap_or($crate::BYTES_PER_LENGTH_OFFSET)
                )+;
                let mut encoder =
                    $crate::composite::container::ContainerEncoder::new(buffer, fixed_region_len);
                $( encoder.append::<$typ>(&self.$field)?; )+
                encoder.finish()
            }

            fn size_ssz(&self) -> usize {
                0 $( + $crate::composite::container::field_size(&self.$field) )+
            }
        }

        impl $crate::SimpleDeserialize for $name {
            fn deserialize(data: &[u8]) -> Result<Self, $crate::SSZError> {
                let mut builder = $crate::composite::container::ContainerDecoderBuilder::new(data);
                $( builder.register_type::<$typ>(); )+
                let mut decoder = builder.build()?;
                Ok(Self {
                    $( $field: decoder.decode_next::<$typ>()?, )+
                })
            }
        }

        impl $crate::SszTypeInfo for $name {
            fn is_fixed_size() -> bool {
                true $( && <$typ as $crate::SszTypeInfo>::is_fixed_size() )+
            }

            fn fixed_size() -> Option<usize> {
                Some(0 $( + <$typ as $crate::SszTypeInfo>::fixed_size()? )+)
            }
        }

        impl $crate::Merkleize for $name {
            fn hash_tree_root(&self) -> Result<$crate::__private::B256, $crate::SSZError> {
                let roots = [$( $crate::Merkleize::hash_tree_root(&self.$field)? ),+];
                $crate::merkleization::merkleize_container(&roots)
            }

            fn chunk_count() -> usize {
                [$( stringify!($field) ),+].len()
            }
        }

        impl $crate::SszSchema for $name {
            fn schema() -> $crate::schema::TypeDescriptor {
                $crate::schema::TypeDescriptor::container(
                    stringify!($name),
                    [$( (stringify!($field), <$typ as $crate::SszSchema>::schema()) ),+],
                )
            }
        }
    };
}
