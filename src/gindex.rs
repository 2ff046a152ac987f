//! Generalized indices.
//!
//! A generalized index addresses a node of an object's Merkle tree: the root is 1 and the
//! children of node `g` are `2g` and `2g + 1`. Paths such as `validators/3/pubkey` or
//! `balances/__len__` are resolved against a [`TypeDescriptor`] without touching any data.

use crate::{BITS_PER_CHUNK, BYTES_PER_CHUNK, SSZError, schema::TypeDescriptor};
use alloc::{format, string::String, vec::Vec};

pub type GeneralizedIndex = u64;

/// Segment name addressing the length node of a list.
pub const LENGTH_SEGMENT: &str = "__len__";

/// One segment of an object path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElement {
    /// Container field, by name.
    Field(String),
    /// Element of a vector, list or bitfield.
    Index(usize),
    /// Length node of a list.
    Length,
}

/// Splits a `/`-delimited path into segments. Empty segments are skipped.
pub fn parse_path(path: &str) -> Result<Vec<PathElement>, SSZError> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if segment == LENGTH_SEGMENT {
                Ok(PathElement::Length)
            } else if segment.bytes().all(|b| b.is_ascii_digit()) {
                segment
                    .parse()
                    .map(PathElement::Index)
                    .map_err(|_| SSZError::InvalidPath(format!("index `{segment}` is too large")))
            } else {
                Ok(PathElement::Field(segment.into()))
            }
        })
        .collect()
}

/// Where a path segment lands inside the current type's data subtree.
struct Step<'a> {
    /// Leaf position within the padded data subtree.
    position: u64,
    /// Type of the addressed child, or `None` when the child is packed into a chunk.
    child: Option<&'a TypeDescriptor>,
    /// Offset of a packed child within its chunk: bytes for basics and bytes, bits for bitfields.
    offset: usize,
}

fn check_bound(index: usize, bound: usize) -> Result<(), SSZError> {
    if index >= bound {
        return Err(SSZError::IndexOutOfBounds { index, bound });
    }
    Ok(())
}

fn step<'a>(ty: &'a TypeDescriptor, element: &PathElement) -> Result<Step<'a>, SSZError> {
    match (ty, element) {
        (TypeDescriptor::Container(container), PathElement::Field(name)) => {
            let position = container.field_position(name).ok_or_else(|| {
                SSZError::FieldNotFound {
                    field: name.clone(),
                    container: container.name.clone(),
                }
            })?;
            Ok(Step {
                position: position as u64,
                child: Some(&container.fields[position].ty),
                offset: 0,
            })
        }
        (TypeDescriptor::Vector(seq) | TypeDescriptor::List(seq), PathElement::Index(index)) => {
            check_bound(*index, seq.bound)?;
            match &seq.elem {
                TypeDescriptor::Basic(basic) => {
                    let byte = index
                        .checked_mul(basic.size())
                        .ok_or(SSZError::GeneralizedIndexOverflow)?;
                    Ok(Step {
                        position: (byte / BYTES_PER_CHUNK) as u64,
                        child: None,
                        offset: byte % BYTES_PER_CHUNK,
                    })
                }
                elem => Ok(Step {
                    position: *index as u64,
                    child: Some(elem),
                    offset: 0,
                }),
            }
        }
        (
            TypeDescriptor::ByteVector(bound) | TypeDescriptor::ByteList(bound),
            PathElement::Index(index),
        ) => {
            check_bound(*index, *bound)?;
            Ok(Step {
                position: (index / BYTES_PER_CHUNK) as u64,
                child: None,
                offset: index % BYTES_PER_CHUNK,
            })
        }
        (
            TypeDescriptor::BitVector(bound) | TypeDescriptor::BitList(bound),
            PathElement::Index(index),
        ) => {
            check_bound(*index, *bound)?;
            Ok(Step {
                position: (index / BITS_PER_CHUNK) as u64,
                child: None,
                offset: index % BITS_PER_CHUNK,
            })
        }
        (TypeDescriptor::Basic(_) | TypeDescriptor::Container(_), PathElement::Index(_)) => {
            Err(SSZError::NotEnumerable(ty.name()))
        }
        (TypeDescriptor::Basic(_), _) => Err(SSZError::NotEnumerable(ty.name())),
        (_, PathElement::Field(name)) => Err(SSZError::InvalidPath(format!(
            "`{name}` is not a field of {}",
            ty.name()
        ))),
        (_, PathElement::Length) => Err(SSZError::NoLengthNode(ty.name())),
    }
}

/// Resolves `path` against `schema`, returning the generalized index of the addressed node and
/// the offset of the value inside that node's chunk (zero unless the value is packed).
pub fn resolve(
    schema: &TypeDescriptor,
    path: &[PathElement],
) -> Result<(GeneralizedIndex, usize), SSZError> {
    let mut gindex: GeneralizedIndex = 1;
    let mut offset = 0;
    let mut current = Some(schema);

    for (i, element) in path.iter().enumerate() {
        let Some(ty) = current else {
            return Err(SSZError::InvalidPath(format!(
                "segment {i} descends into a packed basic value"
            )));
        };

        if *element == PathElement::Length {
            if !ty.is_list_like() {
                return Err(SSZError::NoLengthNode(ty.name()));
            }
            if i + 1 != path.len() {
                return Err(SSZError::InvalidPath(format!(
                    "`{LENGTH_SEGMENT}` must be the last segment"
                )));
            }
            gindex = gindex
                .checked_mul(2)
                .and_then(|g| g.checked_add(1))
                .ok_or(SSZError::GeneralizedIndexOverflow)?;
            return Ok((gindex, 0));
        }

        let next = step(ty, element)?;
        let branching: u64 = if ty.is_list_like() { 2 } else { 1 };
        let width = ty
            .padded_chunk_count()
            .map_err(|_| SSZError::GeneralizedIndexOverflow)?;
        gindex = gindex
            .checked_mul(branching)
            .and_then(|g| g.checked_mul(width as u64))
            .and_then(|g| g.checked_add(next.position))
            .ok_or(SSZError::GeneralizedIndexOverflow)?;
        offset = next.offset;
        current = next.child;
    }

    Ok((gindex, offset))
}

/// Resolves a `/`-delimited path to a generalized index and in-chunk offset.
pub fn resolve_path(
    schema: &TypeDescriptor,
    path: &str,
) -> Result<(GeneralizedIndex, usize), SSZError> {
    resolve(schema, &parse_path(path)?)
}

/// Resolves a `/`-delimited path to a generalized index.
pub fn resolve_generalized_index(
    schema: &TypeDescriptor,
    path: &str,
) -> Result<GeneralizedIndex, SSZError> {
    resolve_path(schema, path).map(|(gindex, _)| gindex)
}

/// Generalized index of leaf `index` in a tree of the given depth.
pub fn generalized_index_from(depth: u32, index: u64) -> Result<GeneralizedIndex, SSZError> {
    let width = 1u64
        .checked_shl(depth)
        .ok_or(SSZError::GeneralizedIndexOverflow)?;
    if index >= width {
        return Err(SSZError::IndexOutOfBounds {
            index: index as usize,
            bound: width as usize,
        });
    }
    Ok(width + index)
}

/// Depth of a node below the root.
pub fn get_generalized_index_length(index: GeneralizedIndex) -> Result<u32, SSZError> {
    if index == 0 {
        return Err(SSZError::InvalidGeneralizedIndex(index));
    }
    Ok(u64::BITS - 1 - index.leading_zeros())
}

/// Bit `position` of `index`: the direction taken at that level, counted from the leaf.
pub fn get_generalized_index_bit(index: GeneralizedIndex, position: u32) -> bool {
    position < u64::BITS && (index >> position) & 1 == 1
}

pub fn sibling(index: GeneralizedIndex) -> GeneralizedIndex {
    index ^ 1
}

pub fn child_left(index: GeneralizedIndex) -> GeneralizedIndex {
    index * 2
}

pub fn child_right(index: GeneralizedIndex) -> GeneralizedIndex {
    index * 2 + 1
}

pub fn parent(index: GeneralizedIndex) -> GeneralizedIndex {
    index / 2
}

/// Composes indices: the result addresses node `indices[n]` of the subtree rooted at
/// `indices[..n]`.
pub fn concat_generalized_indices(
    indices: &[GeneralizedIndex],
) -> Result<GeneralizedIndex, SSZError> {
    indices.iter().try_fold(1u64, |acc, &index| {
        let depth = get_generalized_index_length(index)?;
        let anchor = 1u64 << depth;
        acc.checked_mul(anchor)
            .and_then(|g| g.checked_add(index - anchor))
            .ok_or(SSZError::GeneralizedIndexOverflow)
    })
}

/// Siblings of every node on the path from `index` up to, not including, the root.
pub fn get_branch_indices(index: GeneralizedIndex) -> Vec<GeneralizedIndex> {
    get_path_indices(index).into_iter().map(sibling).collect()
}

/// Nodes on the path from `index` up to, not including, the root.
pub fn get_path_indices(index: GeneralizedIndex) -> Vec<GeneralizedIndex> {
    let mut out = Vec::new();
    let mut current = index;
    while current > 1 {
        out.push(current);
        current = parent(current);
    }
    out
}
