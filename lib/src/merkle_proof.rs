//! Commitment Tree and Membership Proofs
//!
//! This module implements the lean incremental Merkle tree the registration
//! side appends commitments to, and the fixed-depth membership proofs the
//! disclose circuit consumes. A node without a right sibling is carried up to
//! the next level unhashed, so the depth of the tree is `ceil(log2(size))`
//! and a single leaf is its own root.

use std::collections::HashMap;

use ark_bn254::Fr;

use crate::crypto::{parse_fields, poseidon_hash};
use crate::error::DiscloseError;

/// Depth of a lean tree holding `size` leaves
fn depth_for(size: usize) -> usize {
    if size <= 1 {
        0
    } else {
        (usize::BITS - (size - 1).leading_zeros()) as usize
    }
}

/// Append-only lean incremental Merkle tree over field elements
///
/// Leaves are normalised to field elements on the way in, so a commitment is
/// found by value regardless of the text form it was stored under.
#[derive(Debug, Clone, Default)]
pub struct CommitmentTree {
    /// `nodes[0]` holds the leaves, `nodes[depth]` holds the root
    nodes: Vec<Vec<Fr>>,
    index: HashMap<Fr, usize>,
}

impl CommitmentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree by inserting `leaves` in order
    pub fn from_leaves<I>(leaves: I) -> Result<Self, DiscloseError>
    where
        I: IntoIterator<Item = Fr>,
    {
        let mut tree = Self::new();
        for leaf in leaves {
            tree.insert(leaf)?;
        }
        Ok(tree)
    }

    /// Build a tree from decimal or hex leaf strings, as exported by registries
    pub fn from_decimal_leaves<S: AsRef<str>>(leaves: &[S]) -> Result<Self, DiscloseError> {
        Self::from_leaves(parse_fields(leaves)?)
    }

    /// Append a leaf and return its index
    ///
    /// # Arguments
    /// * `leaf` - Commitment to append
    ///
    /// # Returns
    /// * Index of the new leaf
    pub fn insert(&mut self, leaf: Fr) -> Result<usize, DiscloseError> {
        let index = self.size();
        let depth = depth_for(index + 1);

        // Hash the whole path before touching the tree so a failure leaves it intact
        let mut writes = Vec::with_capacity(depth + 1);
        let mut node = leaf;
        let mut position = index;
        for level in 0..depth {
            writes.push((level, position, node));
            if position & 1 == 1 {
                node = poseidon_hash(self.nodes[level][position - 1], node)?;
            }
            position >>= 1;
        }
        writes.push((depth, position, node));

        if self.nodes.len() < depth + 1 {
            self.nodes.resize_with(depth + 1, Vec::new);
        }
        for (level, position, value) in writes {
            let row = &mut self.nodes[level];
            if position < row.len() {
                row[position] = value;
            } else {
                row.push(value);
            }
        }
        self.index.entry(leaf).or_insert(index);
        Ok(index)
    }

    /// Number of leaves
    pub fn size(&self) -> usize {
        self.nodes.first().map_or(0, Vec::len)
    }

    /// Current depth, zero for empty and single-leaf trees
    pub fn depth(&self) -> usize {
        depth_for(self.size())
    }

    /// Current root, `None` while the tree is empty
    pub fn root(&self) -> Option<Fr> {
        self.nodes.last().and_then(|row| row.first()).copied()
    }

    /// Index of the first occurrence of `leaf`
    pub fn index_of(&self, leaf: &Fr) -> Option<usize> {
        self.index.get(leaf).copied()
    }

    pub fn leaves(&self) -> &[Fr] {
        self.nodes.first().map_or(&[], Vec::as_slice)
    }
}

/// Membership proof padded to a fixed depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// Sibling hashes from leaf level upwards, zero past `tree_depth`
    pub siblings: Vec<Fr>,
    /// 1 where the proven node is the right child, zero past `tree_depth`
    pub path_bits: Vec<u8>,
    /// Number of real siblings
    pub tree_depth: usize,
}

impl MerkleProof {
    /// Recompute the root reached from `leaf` along this path
    pub fn compute_root(&self, leaf: Fr) -> Result<Fr, DiscloseError> {
        let mut node = leaf;
        for (sibling, bit) in self
            .siblings
            .iter()
            .zip(&self.path_bits)
            .take(self.tree_depth)
        {
            node = if *bit == 1 {
                poseidon_hash(*sibling, node)?
            } else {
                poseidon_hash(node, *sibling)?
            };
        }
        Ok(node)
    }
}

/// Generate a membership proof for `leaf`
///
/// Levels where the proven node was carried up have no sibling and are
/// skipped, so `tree_depth` can be smaller than the tree's depth.
///
/// # Arguments
/// * `tree` - Tree holding the commitment
/// * `leaf` - Commitment to prove
/// * `depth` - Depth the circuit was compiled for
///
/// # Returns
/// * Proof with exactly `depth` siblings and path bits
pub fn prove_membership(
    tree: &CommitmentTree,
    leaf: &Fr,
    depth: usize,
) -> Result<MerkleProof, DiscloseError> {
    if tree.depth() > depth {
        return Err(DiscloseError::TreeTooDeep {
            actual: tree.depth(),
            max: depth,
        });
    }
    let mut position = tree.index_of(leaf).ok_or(DiscloseError::LeafNotFound)?;

    let mut siblings = Vec::with_capacity(depth);
    let mut path_bits = Vec::with_capacity(depth);
    for level in 0..tree.depth() {
        let is_right = position & 1 == 1;
        let sibling_position = if is_right { position - 1 } else { position + 1 };
        if let Some(sibling) = tree.nodes[level].get(sibling_position) {
            siblings.push(*sibling);
            path_bits.push(is_right as u8);
        }
        position >>= 1;
    }

    let tree_depth = siblings.len();
    siblings.resize(depth, Fr::from(0u64));
    path_bits.resize(depth, 0);
    Ok(MerkleProof {
        siblings,
        path_bits,
        tree_depth,
    })
}
