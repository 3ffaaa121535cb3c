//! Test-only stand-in for the off-chain distribution builder.
//!
//! Mirrors the sorted-pair convention of [`crate::merkle`]: leaves keep
//! insertion order, parents hash the smaller child first, and a trailing odd
//! node is promoted to the next level unchanged.

extern crate std;

use std::vec::Vec as StdVec;

use soroban_sdk::{Address, BytesN, Env, Vec};

use crate::merkle::{hash_pair, leaf_hash};

pub struct MerkleTree {
    env: Env,
    levels: StdVec<StdVec<BytesN<32>>>,
}

impl MerkleTree {
    pub fn new(env: &Env, leaves: &[BytesN<32>]) -> Self {
        assert!(!leaves.is_empty(), "a distribution has at least its sentinel leaf");
        let mut levels = std::vec![leaves.to_vec()];
        while levels[levels.len() - 1].len() > 1 {
            let next = levels[levels.len() - 1]
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => hash_pair(env, a, b),
                    [single] => single.clone(),
                    _ => unreachable!(),
                })
                .collect();
            levels.push(next);
        }
        MerkleTree {
            env: env.clone(),
            levels,
        }
    }

    /// Build the tree for `entries` plus the sentinel `(round, total)` leaf.
    pub fn for_distribution(
        env: &Env,
        round: &Address,
        entries: &[(Address, i128)],
        total: i128,
    ) -> Self {
        let mut leaves: StdVec<BytesN<32>> = entries
            .iter()
            .map(|(account, amount)| leaf_hash(env, account, *amount))
            .collect();
        leaves.push(leaf_hash(env, round, total));
        Self::new(env, &leaves)
    }

    pub fn root(&self) -> BytesN<32> {
        self.levels[self.levels.len() - 1][0].clone()
    }

    pub fn proof(&self, leaf: &BytesN<32>) -> Vec<BytesN<32>> {
        let mut index = self.levels[0]
            .iter()
            .position(|l| l == leaf)
            .expect("leaf not in tree");
        let mut proof = Vec::new(&self.env);
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = index ^ 1;
            if sibling < level.len() {
                proof.push_back(level[sibling].clone());
            }
            index /= 2;
        }
        proof
    }

    pub fn proof_for(&self, account: &Address, amount: i128) -> Vec<BytesN<32>> {
        self.proof(&leaf_hash(&self.env, account, amount))
    }
}
