//! Runtime descriptions of SSZ types.
//!
//! A [`TypeDescriptor`] carries everything the codec, the Merkleizer and the generalized-index
//! resolver need to know about a type. Fixed sizes are computed once when a descriptor is built.

use crate::{
    BITS_PER_CHUNK, BYTES_PER_CHUNK, BYTES_PER_LENGTH_OFFSET,
    SSZError,
    merkleization::{chunk_count_basic_list, next_pow_of_two, packed_chunk_count},
    ssz::SszKind,
};
use alloc::{boxed::Box, string::String, vec::Vec};

/// The basic SSZ types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
}

impl BasicType {
    /// Encoded width in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Bool | Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
            Self::U128 => 16,
            Self::U256 => 32,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::U128 => "uint128",
            Self::U256 => "uint256",
        }
    }
}

/// Element type and bound of a vector or list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSchema {
    pub elem: TypeDescriptor,
    /// Exact length for vectors, maximum length for lists.
    pub bound: usize,
    elem_fixed_size: Option<usize>,
}

impl SequenceSchema {
    pub fn new(elem: TypeDescriptor, bound: usize) -> Self {
        let elem_fixed_size = elem.fixed_size();
        Self {
            elem,
            bound,
            elem_fixed_size,
        }
    }

    /// Fixed size of one element, if the element type is fixed-size.
    pub fn elem_fixed_size(&self) -> Option<usize> {
        self.elem_fixed_size
    }
}

/// A named field of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: String,
    pub ty: TypeDescriptor,
}

/// Ordered fields of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
    fixed_size: Option<usize>,
}

impl ContainerSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        let fixed_size = fields.iter().try_fold(0usize, |total, field| {
            field.ty.fixed_size().map(|size| total.saturating_add(size))
        });
        Self {
            name: name.into(),
            fields,
            fixed_size,
        }
    }

    /// Position of the field called `name`.
    pub fn field_position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Bytes occupied by each field in the fixed region: the field's size, or one offset.
    pub fn fixed_region_layout(&self) -> Vec<Option<usize>> {
        self.fields.iter().map(|field| field.ty.fixed_size()).collect()
    }

    /// Length of the fixed region of an encoding.
    pub fn fixed_region_len(&self) -> usize {
        self.fields
            .iter()
            .map(|field| field.ty.fixed_size().unwrap_or(BYTES_PER_LENGTH_OFFSET))
            .fold(0usize, usize::saturating_add)
    }
}

/// Description of an SSZ type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Basic(BasicType),
    Vector(Box<SequenceSchema>),
    List(Box<SequenceSchema>),
    ByteVector(usize),
    ByteList(usize),
    BitVector(usize),
    BitList(usize),
    Container(Box<ContainerSchema>),
}

impl TypeDescriptor {
    pub fn vector(elem: TypeDescriptor, len: usize) -> Self {
        Self::Vector(Box::new(SequenceSchema::new(elem, len)))
    }

    pub fn list(elem: TypeDescriptor, limit: usize) -> Self {
        Self::List(Box::new(SequenceSchema::new(elem, limit)))
    }

    pub fn container<N: Into<String>>(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (N, TypeDescriptor)>,
    ) -> Self {
        let fields = fields
            .into_iter()
            .map(|(name, ty)| FieldSchema {
                name: name.into(),
                ty,
            })
            .collect();
        Self::Container(Box::new(ContainerSchema::new(name, fields)))
    }

    /// Classifies the described type.
    pub fn kind(&self) -> SszKind {
        match self {
            Self::Basic(_) => SszKind::Basic,
            _ if self.is_fixed_size() => SszKind::FixedComposite,
            _ => SszKind::VariableComposite,
        }
    }

    pub fn is_fixed_size(&self) -> bool {
        self.fixed_size().is_some()
    }

    /// Encoded size of every value of this type, or `None` if it varies.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Self::Basic(basic) => Some(basic.size()),
            Self::Vector(seq) => seq
                .elem_fixed_size()
                .map(|size| size.saturating_mul(seq.bound)),
            Self::ByteVector(len) => Some(*len),
            Self::BitVector(len) => Some(len.div_ceil(8)),
            Self::Container(container) => container.fixed_size,
            Self::List(_) | Self::ByteList(_) | Self::BitList(_) => None,
        }
    }

    pub fn is_basic(&self) -> bool {
        matches!(self, Self::Basic(_))
    }

    /// Lists carry a length chunk mixed into their root.
    pub fn is_list_like(&self) -> bool {
        matches!(self, Self::List(_) | Self::ByteList(_) | Self::BitList(_))
    }

    /// Number of leaves in the type's data subtree before power-of-two padding.
    pub fn chunk_count(&self) -> usize {
        match self {
            Self::Basic(_) => 1,
            Self::Vector(seq) => match &seq.elem {
                TypeDescriptor::Basic(basic) => packed_chunk_count(seq.bound, basic.size()),
                _ => seq.bound,
            },
            Self::List(seq) => match &seq.elem {
                TypeDescriptor::Basic(basic) => chunk_count_basic_list(basic.size(), seq.bound),
                _ => seq.bound,
            },
            Self::ByteVector(len) => len.div_ceil(BYTES_PER_CHUNK),
            Self::ByteList(limit) => chunk_count_basic_list(1, *limit),
            Self::BitVector(len) | Self::BitList(len) => len.div_ceil(BITS_PER_CHUNK),
            Self::Container(container) => container.fields.len(),
        }
    }

    /// Leaves of the data subtree after padding, the base for generalized index arithmetic.
    pub fn padded_chunk_count(&self) -> Result<usize, SSZError> {
        next_pow_of_two(self.chunk_count())
    }

    /// Human-readable name used in error messages.
    pub fn name(&self) -> String {
        use alloc::format;
        match self {
            Self::Basic(basic) => basic.name().into(),
            Self::Vector(seq) => format!("Vector[{}, {}]", seq.elem.name(), seq.bound),
            Self::List(seq) => format!("List[{}, {}]", seq.elem.name(), seq.bound),
            Self::ByteVector(len) => format!("ByteVector[{len}]"),
            Self::ByteList(limit) => format!("ByteList[{limit}]"),
            Self::BitVector(len) => format!("Bitvector[{len}]"),
            Self::BitList(limit) => format!("Bitlist[{limit}]"),
            Self::Container(container) => container.name.clone(),
        }
    }
}
