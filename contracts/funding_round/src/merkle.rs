//! Sorted-pair merkle verification.
//!
//! Leaves are `keccak256(xdr(address) || amount_be128)`. Siblings are
//! combined smaller-hash-first, so a proof is just the ordered list of
//! sibling hashes from leaf to root with no left/right flags. An odd node
//! at the end of a level is carried up unchanged by the off-chain builder,
//! which simply shortens the proof for that leaf.

use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, Vec};

/// Hash of the canonical `(account, amount)` encoding.
pub fn leaf_hash(env: &Env, account: &Address, amount: i128) -> BytesN<32> {
    let mut encoded: Bytes = account.clone().to_xdr(env);
    encoded.extend_from_array(&amount.to_be_bytes());
    env.crypto().keccak256(&encoded).to_bytes()
}

/// Order-independent parent of two nodes.
pub fn hash_pair(env: &Env, a: &BytesN<32>, b: &BytesN<32>) -> BytesN<32> {
    let (a, b) = (a.to_array(), b.to_array());
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = Bytes::from_array(env, &lo);
    buf.extend_from_array(&hi);
    env.crypto().keccak256(&buf).to_bytes()
}

/// Fold `proof` over `leaf` and return the reconstructed root.
pub fn process_proof(env: &Env, leaf: BytesN<32>, proof: &Vec<BytesN<32>>) -> BytesN<32> {
    proof
        .iter()
        .fold(leaf, |node, sibling| hash_pair(env, &node, &sibling))
}

pub fn verify(env: &Env, proof: &Vec<BytesN<32>>, root: &BytesN<32>, leaf: BytesN<32>) -> bool {
    process_proof(env, leaf, proof) == *root
}
