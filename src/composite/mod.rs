//! List of composite modules.

pub mod bitlist;
pub use bitlist::BitList;

pub mod bitvector;
pub use bitvector::BitVector;

pub mod bytes;
pub use bytes::{ByteList, ByteVector};

pub mod container;

pub mod fixed_vectors;
pub use fixed_vectors::FixedVector;

pub mod list;
pub use list::List;

pub mod offsets;

pub mod vectors;
