// Preferred return and carry distributions.
//
// Distributions are built with the test merkle builder, which follows the
// same leaf encoding and sorted-pair convention as the external builder.

extern crate std;

use std::vec::Vec as StdVec;

use soroban_sdk::{testutils::Address as _, vec, Address, BytesN};

use crate::invariants::assert_claim_monotonic;
use crate::math::PRICE_SCALE;
use crate::merkle::leaf_hash;
use crate::merkle_builder::MerkleTree;
use crate::test::{contract_error, Fixture};
use crate::{Error, FundingRoundClient, Slot};

const PRINCIPALS: [i128; 3] = [50_000, 200_000, 500_000];

/// Three investors fund, the round closes, the admin withdraws the principal.
fn closed_round(f: &Fixture, round: &FundingRoundClient) -> StdVec<(Address, i128)> {
    round.open(&f.admin);
    let investors: StdVec<(Address, i128)> = PRINCIPALS
        .iter()
        .map(|principal| {
            let investor = f.investor(*principal);
            let minted = f.fund(round, &investor, *principal);
            (investor, minted)
        })
        .collect();
    round.close(&f.admin);
    round.withdraw(&f.admin);
    investors
}

/// Entries paying each investor `principal * 1.10`.
fn pref_entries(investors: &[(Address, i128)], principals: &[i128]) -> StdVec<(Address, i128)> {
    investors
        .iter()
        .zip(principals)
        .map(|((investor, _), principal)| (investor.clone(), principal * 11_000 / 10_000))
        .collect()
}

fn sentinel_proof(f: &Fixture, tree: &MerkleTree, round: &Address, total: i128) -> soroban_sdk::Vec<BytesN<32>> {
    tree.proof(&leaf_hash(&f.env, round, total))
}

// ─── 1. Preferred return ─────────────────────────────────

#[test]
fn test_preferred_return_scenario() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    assert_eq!(f.token.balance(&f.admin), 750_000);
    assert_eq!(f.round.pref_amount(), 825_000);

    let entries = pref_entries(&investors, &PRINCIPALS);
    let tree = MerkleTree::for_distribution(&f.env, &f.round.address, &entries, 825_000);

    f.mint(&f.admin, 75_000);
    f.approve_treasury(&f.admin, 825_000);
    let proof = sentinel_proof(&f, &tree, &f.round.address, 825_000);
    assert_eq!(f.round.deposit_pref(&f.admin, &tree.root(), &proof), 825_000);
    assert_eq!(f.custody(), 825_000);

    let slot = f.round.pref_slot().expect("pref slot posted");
    assert_eq!(slot.root, tree.root());
    assert_eq!(slot.total_amount, 825_000);

    for (investor, amount) in &entries {
        let claimed_before = f.round.pref_claimed(investor);
        f.round
            .withdraw_pref(investor, &tree.proof_for(investor, *amount), amount);
        assert_claim_monotonic(claimed_before, f.round.pref_claimed(investor));
        assert_eq!(f.token.balance(investor), *amount);
    }
    assert_eq!(f.custody(), 0);
    assert_eq!(f.round.pref_slot().unwrap().claimed_amount, 825_000);

    let (first, amount) = &entries[0];
    assert_eq!(
        f.round
            .try_withdraw_pref(first, &tree.proof_for(first, *amount), amount),
        Err(Ok(contract_error(Error::AlreadyClaimed)))
    );
}

#[test]
fn test_pref_deposit_is_single_shot() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    let entries = pref_entries(&investors, &PRINCIPALS);
    let tree = MerkleTree::for_distribution(&f.env, &f.round.address, &entries, 825_000);
    let proof = sentinel_proof(&f, &tree, &f.round.address, 825_000);

    f.mint(&f.admin, 900_000);
    f.approve_treasury(&f.admin, 1_650_000);
    f.round.deposit_pref(&f.admin, &tree.root(), &proof);

    assert_eq!(
        f.round.try_deposit_pref(&f.admin, &tree.root(), &proof),
        Err(Ok(contract_error(Error::AlreadyDeposited)))
    );
    assert_eq!(f.custody(), 825_000);
}

#[test]
fn test_pref_sentinel_must_match_computed_total() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    let entries = pref_entries(&investors, &PRINCIPALS);

    // A root committing to less than is actually owed.
    let tree = MerkleTree::for_distribution(&f.env, &f.round.address, &entries, 800_000);
    let proof = sentinel_proof(&f, &tree, &f.round.address, 800_000);
    f.mint(&f.admin, 75_000);
    f.approve_treasury(&f.admin, 825_000);

    assert_eq!(
        f.round.try_deposit_pref(&f.admin, &tree.root(), &proof),
        Err(Ok(contract_error(Error::ProofFailed)))
    );
    assert_eq!(f.round.pref_slot(), None);
    assert_eq!(f.custody(), 0);
}

#[test]
fn test_pref_sentinel_is_bound_to_round_identity() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    let entries = pref_entries(&investors, &PRINCIPALS);

    let elsewhere = Address::generate(&f.env);
    let tree = MerkleTree::for_distribution(&f.env, &elsewhere, &entries, 825_000);
    let proof = sentinel_proof(&f, &tree, &elsewhere, 825_000);
    f.mint(&f.admin, 75_000);
    f.approve_treasury(&f.admin, 825_000);

    assert_eq!(
        f.round.try_deposit_pref(&f.admin, &tree.root(), &proof),
        Err(Ok(contract_error(Error::ProofFailed)))
    );
}

#[test]
fn test_failed_pull_leaves_pref_slot_empty() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    let entries = pref_entries(&investors, &PRINCIPALS);
    let tree = MerkleTree::for_distribution(&f.env, &f.round.address, &entries, 825_000);
    let proof = sentinel_proof(&f, &tree, &f.round.address, 825_000);

    // No allowance granted.
    assert_eq!(
        f.round.try_deposit_pref(&f.admin, &tree.root(), &proof),
        Err(Ok(contract_error(Error::InsufficientAllowance)))
    );
    assert_eq!(f.round.pref_slot(), None);
}

#[test]
fn test_deposits_require_admin_and_closed_round() {
    let f = Fixture::new(PRICE_SCALE);
    f.round.open(&f.admin);
    let investor = f.investor(1_000);
    f.fund(&f.round, &investor, 1_000);

    let tree = MerkleTree::for_distribution(&f.env, &f.round.address, &[(investor.clone(), 1_100)], 1_100);
    let proof = sentinel_proof(&f, &tree, &f.round.address, 1_100);

    assert_eq!(
        f.round.try_deposit_pref(&f.admin, &tree.root(), &proof),
        Err(Ok(contract_error(Error::StateError)))
    );
    assert_eq!(
        f.round
            .try_deposit_carry(&f.admin, &tree.root(), &proof, &1_100),
        Err(Ok(contract_error(Error::StateError)))
    );

    f.round.close(&f.admin);
    assert_eq!(
        f.round.try_deposit_pref(&investor, &tree.root(), &proof),
        Err(Ok(contract_error(Error::NotAuthorized)))
    );
}

#[test]
fn test_withdraw_pref_before_deposit_fails() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    let (investor, _) = &investors[0];

    assert_eq!(
        f.round.try_withdraw_pref(investor, &vec![&f.env], &55_000),
        Err(Ok(contract_error(Error::NotDeposited)))
    );
}

#[test]
fn test_withdraw_pref_rejects_altered_claims() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    let entries = pref_entries(&investors, &PRINCIPALS);
    let tree = MerkleTree::for_distribution(&f.env, &f.round.address, &entries, 825_000);
    f.mint(&f.admin, 75_000);
    f.approve_treasury(&f.admin, 825_000);
    f.round.deposit_pref(
        &f.admin,
        &tree.root(),
        &sentinel_proof(&f, &tree, &f.round.address, 825_000),
    );

    let (alice, alice_amount) = &entries[0];
    let (bob, bob_amount) = &entries[1];
    let alice_proof = tree.proof_for(alice, *alice_amount);

    // Inflated amount.
    assert_eq!(
        f.round.try_withdraw_pref(alice, &alice_proof, &(alice_amount + 1)),
        Err(Ok(contract_error(Error::ProofFailed)))
    );
    // Someone else's entry.
    assert_eq!(
        f.round.try_withdraw_pref(alice, &tree.proof_for(bob, *bob_amount), bob_amount),
        Err(Ok(contract_error(Error::ProofFailed)))
    );
    // A stranger replaying Alice's proof.
    let stranger = Address::generate(&f.env);
    assert_eq!(
        f.round.try_withdraw_pref(&stranger, &alice_proof, alice_amount),
        Err(Ok(contract_error(Error::ProofFailed)))
    );
    // The sentinel leaf is not claimable by anyone.
    let sentinel = sentinel_proof(&f, &tree, &f.round.address, 825_000);
    assert_eq!(
        f.round.try_withdraw_pref(&stranger, &sentinel, &825_000),
        Err(Ok(contract_error(Error::ProofFailed)))
    );

    assert!(!f.round.pref_claimed(alice));
    f.round.withdraw_pref(alice, &alice_proof, alice_amount);
    assert!(f.round.pref_claimed(alice));
}

// ─── 2. Carry ────────────────────────────────────────────

/// Carry entries paying each investor their minted token count.
fn carry_tree(f: &Fixture, round: &FundingRoundClient, investors: &[(Address, i128)], total: i128) -> MerkleTree {
    MerkleTree::for_distribution(&f.env, &round.address, investors, total)
}

#[test]
fn test_carry_deposit_and_withdraw_at_each_price() {
    let f = Fixture::new(PRICE_SCALE);
    let sub_unit = f.sibling_round(120_000);
    let twelve = f.sibling_round(1_200_000_000);

    for round in [&f.round, &sub_unit, &twelve] {
        let investors = closed_round(&f, round);
        let total: i128 = investors.iter().map(|(_, minted)| *minted).sum();
        let tree = carry_tree(&f, round, &investors, total);
        let proof = sentinel_proof(&f, &tree, &round.address, total);

        f.mint(&f.admin, total);
        f.approve_treasury(&f.admin, total);
        assert_eq!(round.deposit_carry(&f.admin, &tree.root(), &proof, &total), 0);
        assert_eq!(
            round.try_deposit_carry(&f.admin, &tree.root(), &proof, &total),
            Err(Ok(contract_error(Error::AlreadyDeposited)))
        );

        for (investor, minted) in &investors {
            // Carry proofs do not open the preferred return slot.
            assert_eq!(
                round.try_withdraw_pref(investor, &tree.proof_for(investor, *minted), minted),
                Err(Ok(contract_error(Error::NotDeposited)))
            );
            let index = round.withdraw_carry(
                investor,
                &tree.root(),
                &tree.proof_for(investor, *minted),
                minted,
            );
            assert_eq!(index, 0);
            assert!(round.carry_claimed(&0, investor));
        }
    }
    assert_eq!(f.custody(), 0);
}

#[test]
fn test_carry_rounds_are_independent() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    let (alice, _) = &investors[0];

    let first = carry_tree(&f, &f.round, &[(alice.clone(), 1_000)], 1_000);
    let second = carry_tree(&f, &f.round, &[(alice.clone(), 2_500)], 2_500);

    f.mint(&f.admin, 3_500);
    f.approve_treasury(&f.admin, 3_500);
    let i0 = f.round.deposit_carry(
        &f.admin,
        &first.root(),
        &sentinel_proof(&f, &first, &f.round.address, 1_000),
        &1_000,
    );
    let i1 = f.round.deposit_carry(
        &f.admin,
        &second.root(),
        &sentinel_proof(&f, &second, &f.round.address, 2_500),
        &2_500,
    );
    assert_eq!((i0, i1), (0, 1));
    assert_eq!(f.round.carry_round_count(), 2);
    assert_eq!(f.round.carry_index(&second.root()), Some(1));

    let posted = f.round.carry_round(&1);
    assert_eq!(posted.root, second.root());
    assert_eq!(posted.total_amount, 2_500);

    f.round
        .withdraw_carry(alice, &first.root(), &first.proof_for(alice, 1_000), &1_000);
    assert!(f.round.carry_claimed(&0, alice));
    assert!(!f.round.carry_claimed(&1, alice));

    assert_eq!(
        f.round
            .try_withdraw_carry(alice, &first.root(), &first.proof_for(alice, 1_000), &1_000),
        Err(Ok(contract_error(Error::AlreadyClaimed)))
    );
    assert_eq!(
        f.round
            .withdraw_carry(alice, &second.root(), &second.proof_for(alice, 2_500), &2_500),
        1
    );
    assert_eq!(f.token.balance(alice), 3_500);
}

#[test]
fn test_carry_payouts_stop_at_committed_total() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    let (alice, _) = &investors[0];
    let (bob, _) = &investors[1];

    // Entries adding up to more than the committed total.
    let tree = carry_tree(
        &f,
        &f.round,
        &[(alice.clone(), 600), (bob.clone(), 600)],
        1_000,
    );
    f.mint(&f.admin, 1_000);
    f.approve_treasury(&f.admin, 1_000);
    f.round.deposit_carry(
        &f.admin,
        &tree.root(),
        &sentinel_proof(&f, &tree, &f.round.address, 1_000),
        &1_000,
    );

    f.round
        .withdraw_carry(alice, &tree.root(), &tree.proof_for(alice, 600), &600);
    assert_eq!(
        f.round
            .try_withdraw_carry(bob, &tree.root(), &tree.proof_for(bob, 600), &600),
        Err(Ok(contract_error(Error::InsufficientBalance)))
    );
    assert!(!f.round.carry_claimed(&0, bob));

    let posted = f.round.carry_round(&0);
    assert_eq!(posted.claimed_amount, 600);
    assert_eq!(f.custody(), 400);
}

#[test]
fn test_oversized_leaf_cannot_reach_sibling_custody() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    let (alice, _) = &investors[0];

    let sibling = f.sibling_round(PRICE_SCALE);
    sibling.open(&f.admin);
    let backer = f.investor(300_000);
    f.fund(&sibling, &backer, 300_000);
    sibling.close(&f.admin);

    let tree = carry_tree(&f, &f.round, &[(alice.clone(), 250_000)], 1_000);
    f.mint(&f.admin, 1_000);
    f.approve_treasury(&f.admin, 1_000);
    f.round.deposit_carry(
        &f.admin,
        &tree.root(),
        &sentinel_proof(&f, &tree, &f.round.address, 1_000),
        &1_000,
    );
    assert_eq!(f.custody(), 301_000);

    assert_eq!(
        f.round
            .try_withdraw_carry(alice, &tree.root(), &tree.proof_for(alice, 250_000), &250_000),
        Err(Ok(contract_error(Error::InsufficientBalance)))
    );
    assert_eq!(f.custody(), 301_000);
    assert_eq!(f.round.carry_round(&0).claimed_amount, 0);

    assert_eq!(sibling.withdraw(&f.admin), 300_000);
    assert_eq!(f.custody(), 1_000);
}

#[test]
fn test_withdraw_carry_unknown_root() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    let (alice, minted) = &investors[0];
    let tree = carry_tree(&f, &f.round, &investors, 750_000);

    assert_eq!(
        f.round
            .try_withdraw_carry(alice, &tree.root(), &tree.proof_for(alice, *minted), minted),
        Err(Ok(contract_error(Error::CarryRoundNotFound)))
    );
    assert_eq!(
        f.round.try_carry_round(&0),
        Err(Ok(contract_error(Error::CarryRoundNotFound)))
    );
}

#[test]
fn test_carry_sentinel_must_match_argument() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    let tree = carry_tree(&f, &f.round, &investors, 100_000);
    let proof = sentinel_proof(&f, &tree, &f.round.address, 100_000);
    f.mint(&f.admin, 200_000);
    f.approve_treasury(&f.admin, 200_000);

    assert_eq!(
        f.round
            .try_deposit_carry(&f.admin, &tree.root(), &proof, &200_000),
        Err(Ok(contract_error(Error::ProofFailed)))
    );
    assert_eq!(
        f.round.try_deposit_carry(&f.admin, &tree.root(), &proof, &0),
        Err(Ok(contract_error(Error::InvalidAmount)))
    );
    assert_eq!(f.round.carry_round_count(), 0);
}

#[test]
fn test_empty_distribution_is_sentinel_only() {
    let f = Fixture::new(PRICE_SCALE);
    let investors = closed_round(&f, &f.round);
    let tree = MerkleTree::for_distribution(&f.env, &f.round.address, &[], 5_000);
    assert_eq!(tree.root(), leaf_hash(&f.env, &f.round.address, 5_000));

    f.mint(&f.admin, 5_000);
    f.approve_treasury(&f.admin, 5_000);
    let index = f
        .round
        .deposit_carry(&f.admin, &tree.root(), &vec![&f.env], &5_000);

    let (alice, _) = &investors[0];
    assert_eq!(
        f.round
            .try_withdraw_carry(alice, &tree.root(), &vec![&f.env], &5_000),
        Err(Ok(contract_error(Error::ProofFailed)))
    );
    assert!(!f.round.carry_claimed(&index, alice));
    assert_eq!(f.custody(), 5_000);
}

#[test]
fn test_claim_slots_are_separate() {
    assert_ne!(Slot::Pref, Slot::Carry(0));
    assert_ne!(Slot::Carry(0), Slot::Carry(1));
}
