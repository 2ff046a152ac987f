//! SSZ serialization, merkleization and generalized-index tooling for beacon-chain types.
#![no_std]
extern crate alloc;

pub mod basic;
pub use basic::*;

pub mod composite;
pub use composite::*;

pub mod ssz;
pub use ssz::*;

pub mod error;
pub use error::*;

pub mod constants;
pub use constants::*;

pub mod merkleization;
pub use merkleization::{
    cache::{CacheConfig, HashCache},
    proofs::{MultiProof, Proof},
};

pub mod schema;
pub use schema::{BasicType, ContainerSchema, FieldSchema, SequenceSchema, TypeDescriptor};

pub mod value;
pub use value::SszValue;

pub mod gindex;
pub use gindex::{
    GeneralizedIndex, LENGTH_SEGMENT, PathElement, parse_path, resolve_generalized_index,
    resolve_path,
};

#[cfg(test)]
mod test_types;

#[doc(hidden)]
pub mod __private {
    pub use alloc::vec::Vec;
    pub use alloy_primitives::B256;
}
