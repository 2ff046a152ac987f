//! Precomputes the roots of all-zero subtrees so merkleization never hashes padding.

use sha2::{Digest, Sha256};
use std::{env, fmt::Write, fs, path::Path};

/// Keep in sync with `MAX_MERKLE_TREE_DEPTH` in `src/constants.rs`.
const MAX_MERKLE_TREE_DEPTH: usize = 64;

fn main() {
    let mut zero_hashes = vec![[0u8; 32]; MAX_MERKLE_TREE_DEPTH + 1];
    for height in 1..=MAX_MERKLE_TREE_DEPTH {
        let mut hasher = Sha256::new();
        hasher.update(zero_hashes[height - 1]);
        hasher.update(zero_hashes[height - 1]);
        zero_hashes[height] = hasher.finalize().into();
    }

    let mut out = String::new();
    writeln!(
        out,
        "/// Roots of all-zero subtrees, indexed by subtree height."
    )
    .unwrap();
    writeln!(
        out,
        "pub(crate) const ZERO_HASHES: [[u8; 32]; {}] = [",
        MAX_MERKLE_TREE_DEPTH + 1
    )
    .unwrap();
    for hash in &zero_hashes {
        let bytes: Vec<String> = hash.iter().map(|b| format!("{b:#04x}")).collect();
        writeln!(out, "    [{}],", bytes.join(", ")).unwrap();
    }
    writeln!(out, "];").unwrap();

    let dest = Path::new(&env::var("OUT_DIR").expect("cargo sets OUT_DIR")).join("zero_hashes.rs");
    fs::write(dest, out).expect("can write zero hash table");
    println!("cargo:rerun-if-changed=build.rs");
}
