//! Basic types: booleans and unsigned integers.

pub mod boolean;
pub mod uint;
