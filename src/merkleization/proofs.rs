//! Support for constructing and verifying Merkle proofs.

use crate::{
    SSZError, SimpleSerialize, SszSchema,
    gindex::{
        GeneralizedIndex, get_branch_indices, get_generalized_index_bit,
        get_generalized_index_length, get_path_indices, parent, resolve_generalized_index,
        sibling,
    },
    merkleization::{Chunk, hash_chunks, zero_hash},
    schema::TypeDescriptor,
    ssz::serialize,
    value::SszValue,
};
use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec::Vec,
};
use alloy_primitives::B256;

/// Every layer of a padded Merkle tree over some chunks.
///
/// Only nodes with data beneath them are stored; nodes over padding are read from the zero
/// hash table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleLayers {
    layers: Vec<Vec<Chunk>>,
}

impl MerkleLayers {
    /// Builds the tree over `chunks` padded to `leaf_count` leaves, a power of two.
    pub fn new(chunks: &[Chunk], leaf_count: usize) -> Result<Self, SSZError> {
        if chunks.len() > leaf_count {
            return Err(SSZError::ChunkCountExceedsLimit {
                count: chunks.len(),
                limit: leaf_count,
            });
        }
        let depth = leaf_count.trailing_zeros() as usize;

        let mut layers = Vec::with_capacity(depth + 1);
        layers.push(chunks.to_vec());
        for height in 0..depth {
            let below = &layers[height];
            let next = below
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_chunks(left, right),
                    [left] => hash_chunks(left, zero_hash(height)),
                    _ => zero_hash(height + 1),
                })
                .collect();
            layers.push(next);
        }
        Ok(Self { layers })
    }

    /// Height of the tree: the number of hashes between a leaf and the root.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// Node `index` of the layer `height` levels above the leaves.
    pub fn node(&self, height: usize, index: usize) -> Chunk {
        self.layers
            .get(height)
            .and_then(|layer| layer.get(index))
            .copied()
            .unwrap_or_else(|| zero_hash(height))
    }

    pub fn root(&self) -> Chunk {
        self.node(self.depth(), 0)
    }

    /// Node addressed by a generalized index local to this tree.
    pub fn node_at(&self, gindex: GeneralizedIndex) -> Result<Chunk, SSZError> {
        let depth = get_generalized_index_length(gindex)? as usize;
        if depth > self.depth() {
            return Err(SSZError::InvalidGeneralizedIndex(gindex));
        }
        let index = (gindex - (1 << depth)) as usize;
        Ok(self.node(self.depth() - depth, index))
    }

    /// Siblings on the path from `gindex` to the root, bottom first.
    pub fn branch(&self, gindex: GeneralizedIndex) -> Result<Vec<Chunk>, SSZError> {
        get_branch_indices(gindex)
            .into_iter()
            .map(|index| self.node_at(index))
            .collect()
    }
}

/// A Merkle proof of a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub leaf: B256,
    /// Sibling nodes from the leaf up to the root.
    pub branch: Vec<B256>,
    pub gindex: GeneralizedIndex,
}

impl Proof {
    pub fn verify(&self, root: B256) -> Result<(), SSZError> {
        verify_merkle_proof(self.leaf, &self.branch, self.gindex, root)
    }
}

/// A Merkle proof of several nodes sharing one set of helper nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiProof {
    pub leaves: Vec<B256>,
    /// Helper nodes, ordered as [`get_helper_indices`] returns them.
    pub branch: Vec<B256>,
    pub indices: Vec<GeneralizedIndex>,
}

impl MultiProof {
    pub fn verify(&self, root: B256) -> Result<(), SSZError> {
        verify_merkle_multiproof(&self.leaves, &self.branch, &self.indices, root)
    }
}

/// Index of `gindex` relative to the subtree rooted at its ancestor `levels` levels up.
fn strip_ancestor(gindex: GeneralizedIndex, levels: u32) -> GeneralizedIndex {
    let anchor = 1u64 << levels;
    anchor | (gindex & (anchor - 1))
}

fn length_chunk(len: usize) -> Chunk {
    let mut chunk = [0u8; 32];
    chunk[..8].copy_from_slice(&(len as u64).to_le_bytes());
    chunk
}

impl TypeDescriptor {
    /// Child type and value behind leaf `index` of the data subtree, if that leaf is a
    /// composite child's root.
    fn composite_child<'a>(
        &'a self,
        value: &'a SszValue,
        index: usize,
    ) -> Option<(&'a TypeDescriptor, &'a SszValue)> {
        match (self, value) {
            (Self::Vector(seq), SszValue::Vector(items))
            | (Self::List(seq), SszValue::List(items))
                if !seq.elem.is_basic() =>
            {
                items.get(index).map(|item| (&seq.elem, item))
            }
            (Self::Container(container), SszValue::Container(fields)) => container
                .fields
                .get(index)
                .zip(fields.get(index))
                .map(|(field, field_value)| (&field.ty, field_value)),
            _ => None,
        }
    }

    /// Pushes the branch for `gindex` within the data subtree of `value`, returning the leaf.
    fn prove_data(
        &self,
        value: &SszValue,
        gindex: GeneralizedIndex,
        branch: &mut Vec<Chunk>,
    ) -> Result<Chunk, SSZError> {
        let layers = MerkleLayers::new(&self.chunks(value)?, self.padded_chunk_count()?)?;
        let tree_depth = layers.depth() as u32;
        let depth = get_generalized_index_length(gindex)?;

        let (local, leaf) = if depth > tree_depth {
            let local = gindex >> (depth - tree_depth);
            let index = (local - (1 << tree_depth)) as usize;
            let (child_ty, child_value) = self
                .composite_child(value, index)
                .ok_or(SSZError::InvalidGeneralizedIndex(gindex))?;
            let leaf =
                child_ty.prove_into(child_value, strip_ancestor(gindex, depth - tree_depth), branch)?;
            (local, leaf)
        } else {
            (gindex, layers.node_at(gindex)?)
        };

        branch.extend(layers.branch(local)?);
        Ok(leaf)
    }

    fn prove_into(
        &self,
        value: &SszValue,
        gindex: GeneralizedIndex,
        branch: &mut Vec<Chunk>,
    ) -> Result<Chunk, SSZError> {
        let depth = get_generalized_index_length(gindex)?;
        if depth == 0 {
            return Ok(self.hash_tree_root(value)?.0);
        }
        if !self.is_list_like() {
            return self.prove_data(value, gindex, branch);
        }

        let len = value.len().ok_or(SSZError::InvalidGeneralizedIndex(gindex))?;
        if get_generalized_index_bit(gindex, depth - 1) {
            // Right of the root is the length node, which has no children.
            if depth != 1 {
                return Err(SSZError::InvalidGeneralizedIndex(gindex));
            }
            branch.push(self.data_root(value)?.0);
            return Ok(length_chunk(len));
        }

        let leaf = self.prove_data(value, strip_ancestor(gindex, depth - 1), branch)?;
        branch.push(length_chunk(len));
        Ok(leaf)
    }

    /// Builds a proof of node `gindex` in the Merkle tree of `value`.
    pub fn prove(&self, value: &SszValue, gindex: GeneralizedIndex) -> Result<Proof, SSZError> {
        let mut branch = Vec::new();
        let leaf = self.prove_into(value, gindex, &mut branch)?;
        Ok(Proof {
            leaf: B256::from(leaf),
            branch: branch.into_iter().map(B256::from).collect(),
            gindex,
        })
    }

    /// Value of node `gindex` in the Merkle tree of `value`.
    pub fn node(&self, value: &SszValue, gindex: GeneralizedIndex) -> Result<B256, SSZError> {
        self.prove(value, gindex).map(|proof| proof.leaf)
    }

    /// Builds one proof covering every node in `indices`.
    pub fn multi_prove(
        &self,
        value: &SszValue,
        indices: &[GeneralizedIndex],
    ) -> Result<MultiProof, SSZError> {
        let leaves = indices
            .iter()
            .map(|&gindex| self.node(value, gindex))
            .collect::<Result<Vec<_>, _>>()?;
        let branch = get_helper_indices(indices)
            .into_iter()
            .map(|gindex| self.node(value, gindex))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MultiProof {
            leaves,
            branch,
            indices: indices.to_vec(),
        })
    }
}

/// Proves the node at `path` in `value`, returning the proof and the root it verifies against.
pub fn prove<T>(value: &T, path: &str) -> Result<(Proof, B256), SSZError>
where
    T: SimpleSerialize + SszSchema,
{
    let schema = T::schema();
    let gindex = resolve_generalized_index(&schema, path)?;
    let dynamic = schema.deserialize(&serialize(value)?)?;
    let root = schema.hash_tree_root(&dynamic)?;
    Ok((schema.prove(&dynamic, gindex)?, root))
}

/// Proves the nodes at `paths` in `value` with a single multiproof.
pub fn multi_prove<T>(value: &T, paths: &[&str]) -> Result<(MultiProof, B256), SSZError>
where
    T: SimpleSerialize + SszSchema,
{
    let schema = T::schema();
    let indices = paths
        .iter()
        .map(|path| resolve_generalized_index(&schema, path))
        .collect::<Result<Vec<_>, _>>()?;
    let dynamic = schema.deserialize(&serialize(value)?)?;
    let root = schema.hash_tree_root(&dynamic)?;
    Ok((schema.multi_prove(&dynamic, &indices)?, root))
}

/// Folds `branch` into `leaf` along the path of `gindex`.
pub fn calculate_merkle_root(
    leaf: B256,
    branch: &[B256],
    gindex: GeneralizedIndex,
) -> Result<B256, SSZError> {
    if get_generalized_index_length(gindex)? as usize != branch.len() {
        return Err(SSZError::InvalidProof);
    }
    let root = branch
        .iter()
        .enumerate()
        .fold(leaf.0, |node, (i, branch_node)| {
            if get_generalized_index_bit(gindex, i as u32) {
                hash_chunks(branch_node, node)
            } else {
                hash_chunks(node, branch_node)
            }
        });
    Ok(B256::from(root))
}

pub fn verify_merkle_proof(
    leaf: B256,
    branch: &[B256],
    gindex: GeneralizedIndex,
    root: B256,
) -> Result<(), SSZError> {
    if calculate_merkle_root(leaf, branch, gindex)? == root {
        Ok(())
    } else {
        tracing::debug!(gindex, %root, "merkle proof does not match root");
        Err(SSZError::InvalidProof)
    }
}

/// Checks a branch of `depth` siblings for leaf `index` of a tree, as beacon chain deposit
/// and light client proofs are checked.
pub fn is_valid_merkle_branch(
    leaf: B256,
    branch: &[B256],
    depth: usize,
    index: u64,
    root: B256,
) -> bool {
    if branch.len() < depth {
        return false;
    }
    let mut value = leaf.0;
    for (i, branch_node) in branch.iter().take(depth).enumerate() {
        value = if i < 64 && (index >> i) & 1 == 1 {
            hash_chunks(branch_node, value)
        } else {
            hash_chunks(value, branch_node)
        };
    }
    B256::from(value) == root
}

/// Indices of the nodes needed, besides the leaves themselves, to recompute the root of a
/// multiproof. Sorted in descending order.
pub fn get_helper_indices(indices: &[GeneralizedIndex]) -> Vec<GeneralizedIndex> {
    let mut helpers = BTreeSet::new();
    let mut paths = BTreeSet::new();
    for &index in indices {
        helpers.extend(get_branch_indices(index));
        paths.extend(get_path_indices(index));
    }
    helpers
        .iter()
        .rev()
        .filter(|index| !paths.contains(index))
        .copied()
        .collect()
}

pub fn calculate_multi_merkle_root(
    leaves: &[B256],
    proof: &[B256],
    indices: &[GeneralizedIndex],
) -> Result<B256, SSZError> {
    if leaves.len() != indices.len() {
        return Err(SSZError::InvalidProof);
    }
    let helper_indices = get_helper_indices(indices);
    if proof.len() != helper_indices.len() {
        return Err(SSZError::InvalidProof);
    }

    let mut objects: BTreeMap<GeneralizedIndex, B256> = indices
        .iter()
        .copied()
        .zip(leaves.iter().copied())
        .chain(helper_indices.iter().copied().zip(proof.iter().copied()))
        .collect();

    let mut keys: Vec<GeneralizedIndex> = objects.keys().rev().copied().collect();
    let mut pos = 0;
    while pos < keys.len() {
        let key = keys[pos];
        let parent_index = parent(key);
        if key > 1
            && objects.contains_key(&sibling(key))
            && !objects.contains_key(&parent_index)
        {
            let right_index = key | 1;
            let left = objects.get(&sibling(right_index));
            let right = objects.get(&right_index);
            if let (Some(left), Some(right)) = (left, right) {
                let node = B256::from(hash_chunks(left, right));
                objects.insert(parent_index, node);
                keys.push(parent_index);
            }
        }
        pos += 1;
    }

    objects.get(&1).copied().ok_or(SSZError::InvalidProof)
}

pub fn verify_merkle_multiproof(
    leaves: &[B256],
    proof: &[B256],
    indices: &[GeneralizedIndex],
    root: B256,
) -> Result<(), SSZError> {
    if calculate_multi_merkle_root(leaves, proof, indices)? == root {
        Ok(())
    } else {
        tracing::debug!(?indices, %root, "merkle multiproof does not match root");
        Err(SSZError::InvalidProof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ErrorKind, List, Merkleize,
        gindex::resolve_generalized_index,
        merkleization::merkleize,
        schema::BasicType,
    };
    use alloc::vec;

    fn chunk(byte: u8) -> Chunk {
        [byte; 32]
    }

    #[test]
    fn test_merkle_layers() {
        let chunks = [chunk(1), chunk(2), chunk(3)];
        let layers = MerkleLayers::new(&chunks, 4).unwrap();
        assert_eq!(layers.depth(), 2);
        assert_eq!(
            B256::from(layers.root()),
            merkleize(&chunks, Some(4)).unwrap()
        );
        assert_eq!(layers.node_at(7).unwrap(), zero_hash(0));
        assert_eq!(layers.node_at(4).unwrap(), chunk(1));
        assert_eq!(
            layers.branch(6).unwrap(),
            vec![zero_hash(0), hash_chunks(chunk(1), chunk(2))]
        );
        assert!(layers.node_at(8).is_err());
        assert!(MerkleLayers::new(&chunks, 2).is_err());

        // Subtrees over padding come from the zero hash table.
        let sparse = MerkleLayers::new(&chunks[..1], 1 << 20).unwrap();
        assert_eq!(sparse.node(19, 1), zero_hash(19));
    }

    #[test]
    fn test_verify_merkle_proof() {
        //        root
        //       /    \
        //    leaf    proof
        //   (idx 2)  (idx 3)
        let leaf = B256::from(chunk(1));
        let proof = B256::from(chunk(2));
        let root = B256::from(hash_chunks(leaf, proof));

        assert!(verify_merkle_proof(leaf, &[proof], 2, root).is_ok());
        assert_eq!(
            verify_merkle_proof(leaf, &[proof], 3, root),
            Err(SSZError::InvalidProof)
        );
        assert_eq!(
            calculate_merkle_root(leaf, &[], 2).unwrap_err().kind(),
            ErrorKind::InvalidProof
        );
        assert!(is_valid_merkle_branch(leaf, &[proof], 1, 0, root));
        assert!(!is_valid_merkle_branch(leaf, &[proof], 1, 1, root));
        assert!(!is_valid_merkle_branch(leaf, &[], 1, 0, root));
    }

    #[test]
    fn test_get_helper_indices() {
        assert_eq!(get_helper_indices(&[8, 9, 14]), vec![15, 6, 5]);
        assert_eq!(get_helper_indices(&[2]), vec![3]);
        assert!(get_helper_indices(&[2, 3]).is_empty());
        // Helpers shared by several leaves appear once, largest first.
        assert_eq!(get_helper_indices(&[8, 10]), vec![11, 9, 3]);
        assert_eq!(get_helper_indices(&[4, 2]), vec![5, 3]);
    }

    #[test]
    fn test_multiproof_round_trip() {
        let leaves: Vec<Chunk> = (1..=8).map(chunk).collect();
        let layers = MerkleLayers::new(&leaves, 8).unwrap();
        let root = B256::from(layers.root());

        let indices = [8, 9, 14];
        let proof = MultiProof {
            leaves: indices
                .iter()
                .map(|&i| B256::from(layers.node_at(i).unwrap()))
                .collect(),
            branch: get_helper_indices(&indices)
                .into_iter()
                .map(|i| B256::from(layers.node_at(i).unwrap()))
                .collect(),
            indices: indices.to_vec(),
        };
        assert!(proof.verify(root).is_ok());

        let mut tampered = proof.clone();
        tampered.leaves[0] = B256::ZERO;
        assert_eq!(tampered.verify(root), Err(SSZError::InvalidProof));

        let mut short = proof;
        short.branch.pop();
        assert_eq!(short.verify(root), Err(SSZError::InvalidProof));
    }

    #[test]
    fn test_prove_list_nodes() {
        let list = List::<u64, 16>::new(vec![1, 2, 3, 4, 5, 6]).unwrap();
        let root = list.hash_tree_root().unwrap();
        let schema = List::<u64, 16>::schema();
        let value = schema.deserialize(&serialize(&list).unwrap()).unwrap();

        // Length node.
        let proof = schema.prove(&value, 3).unwrap();
        assert_eq!(proof.leaf, B256::from(length_chunk(6)));
        assert_eq!(proof.branch.len(), 1);
        assert!(proof.verify(root).is_ok());

        // Second chunk of packed values holds 5 and 6.
        let gindex = resolve_generalized_index(&schema, "5").unwrap();
        assert_eq!(gindex, 2 * 4 + 1);
        let proof = schema.prove(&value, gindex).unwrap();
        assert_eq!(proof.leaf.0[0], 5);
        assert_eq!(proof.leaf.0[8], 6);
        assert!(proof.verify(root).is_ok());

        // The root proves itself.
        let proof = schema.prove(&value, 1).unwrap();
        assert_eq!(proof.leaf, root);
        assert!(proof.branch.is_empty());

        // Below the length node or a packed chunk there is nothing to prove.
        assert!(schema.prove(&value, 6).is_err());
        assert!(schema.prove(&value, 9 * 2).is_err());
    }

    #[test]
    fn test_prove_nested_container() {
        let inner = TypeDescriptor::container(
            "Inner",
            [
                ("a", TypeDescriptor::Basic(BasicType::U64)),
                ("b", TypeDescriptor::Basic(BasicType::U64)),
                ("c", TypeDescriptor::Basic(BasicType::U64)),
            ],
        );
        let outer = TypeDescriptor::container(
            "Outer",
            [
                ("x", TypeDescriptor::Basic(BasicType::U16)),
                ("items", TypeDescriptor::list(inner, 4)),
            ],
        );
        let item = |n: u64| SszValue::Container(vec![n.into(), (n + 1).into(), (n + 2).into()]);
        let value = SszValue::Container(vec![
            SszValue::U16(7),
            SszValue::List(vec![item(10), item(20)]),
        ]);
        let root = outer.hash_tree_root(&value).unwrap();

        let gindex = resolve_generalized_index(&outer, "items/1/c").unwrap();
        let proof = outer.prove(&value, gindex).unwrap();
        assert_eq!(proof.leaf, 22u64.hash_tree_root().unwrap());
        assert!(proof.verify(root).is_ok());

        let paths = ["x", "items/0/a", "items/__len__"];
        let indices: Vec<_> = paths
            .iter()
            .map(|path| resolve_generalized_index(&outer, path).unwrap())
            .collect();
        let multi = outer.multi_prove(&value, &indices).unwrap();
        assert_eq!(multi.leaves[0], 7u16.hash_tree_root().unwrap());
        assert!(multi.verify(root).is_ok());

        // Element 3 is padding.
        let padding = resolve_generalized_index(&outer, "items/3").unwrap();
        assert_eq!(outer.node(&value, padding), Ok(B256::ZERO));
        let below_padding = resolve_generalized_index(&outer, "items/3/a").unwrap();
        assert!(outer.prove(&value, below_padding).is_err());
    }

    #[test]
    fn test_prove_static_value() {
        let list = List::<List<u8, 4>, 4>::new(vec![
            List::new(vec![1, 2]).unwrap(),
            List::new(vec![3]).unwrap(),
        ])
        .unwrap();
        let (proof, root) = prove(&list, "1/__len__").unwrap();
        assert_eq!(root, list.hash_tree_root().unwrap());
        assert_eq!(proof.leaf, B256::from(length_chunk(1)));
        assert!(proof.verify(root).is_ok());

        let (multi, root) = multi_prove(&list, &["0/0", "1/0", "__len__"]).unwrap();
        assert!(multi.verify(root).is_ok());
    }
}
