#![cfg(test)]

use super::*;
use qualification_interface::{EntryRequirementKind, ExtensionConfig};
use soroban_sdk::{testutils::Address as _, vec, Address, Env};

fn setup_contract(env: &Env) -> (QualificationLedgerClient, Address) {
    let orchestrator = Address::generate(env);
    let contract_id = env.register_contract(None, QualificationLedger);
    let client = QualificationLedgerClient::new(env, &contract_id);

    client.initialize(&orchestrator);

    (client, orchestrator)
}

fn token_requirement(env: &Env, entry_limit: u32) -> EntryRequirement {
    EntryRequirement {
        entry_limit,
        kind: EntryRequirementKind::Token(Address::generate(env)),
    }
}

#[test]
fn test_initialize() {
    let env = Env::default();
    env.mock_all_auths();

    let (client, orchestrator) = setup_contract(&env);

    assert_eq!(client.get_orchestrator(), orchestrator);

    // Should fail on second initialization
    let result = client.try_initialize(&orchestrator);
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
}

#[test]
fn test_requirement_roundtrip() {
    let env = Env::default();
    env.mock_all_auths();

    let (client, _orchestrator) = setup_contract(&env);

    // Nothing installed yet
    assert_eq!(client.get_requirement(&1), None);

    let requirement = token_requirement(&env, 3);
    client.set_requirement(&1, &Some(requirement.clone()));
    assert_eq!(client.get_requirement(&1), Some(requirement));

    // Clearing restores the "no requirement" sentinel
    client.set_requirement(&1, &None);
    assert_eq!(client.get_requirement(&1), None);
}

#[test]
fn test_requirement_full_replace() {
    let env = Env::default();
    env.mock_all_auths();

    let (client, _orchestrator) = setup_contract(&env);

    let allowlist = EntryRequirement {
        entry_limit: 1,
        kind: EntryRequirementKind::Allowlist(vec![
            &env,
            Address::generate(&env),
            Address::generate(&env),
        ]),
    };
    client.set_requirement(&7, &Some(allowlist));

    let extension = EntryRequirement {
        entry_limit: 0,
        kind: EntryRequirementKind::Extension(ExtensionConfig {
            validator: Address::generate(&env),
            config: vec![&env, 1u128, 4u128, 0u128, 10u128],
        }),
    };
    client.set_requirement(&7, &Some(extension.clone()));

    assert_eq!(client.get_requirement(&7), Some(extension));
}

#[test]
fn test_entries_default_zero() {
    let env = Env::default();
    env.mock_all_auths();

    let (client, _orchestrator) = setup_contract(&env);

    let proof = QualificationProof::Nft(42);
    let entries = client.get_entries(&5, &proof);

    assert_eq!(entries.tournament_id, 5);
    assert_eq!(entries.proof, proof);
    assert_eq!(entries.entry_count, 0);
}

#[test]
fn test_set_entries_overwrite() {
    let env = Env::default();
    env.mock_all_auths();

    let (client, _orchestrator) = setup_contract(&env);

    let proof = QualificationProof::Address(Address::generate(&env));
    client.set_entries(&QualificationEntries {
        tournament_id: 9,
        proof: proof.clone(),
        entry_count: 4,
    });

    assert_eq!(client.get_entries(&9, &proof).entry_count, 4);

    client.set_entries(&QualificationEntries {
        tournament_id: 9,
        proof: proof.clone(),
        entry_count: 2,
    });

    assert_eq!(client.get_entries(&9, &proof).entry_count, 2);
}

#[test]
fn test_record_entry_unlimited_is_noop() {
    let env = Env::default();
    env.mock_all_auths();

    let (client, _orchestrator) = setup_contract(&env);

    let proof = QualificationProof::Nft(1);
    let requirement = token_requirement(&env, 0);

    client.record_entry(&3, &proof, &requirement);
    client.record_entry(&3, &proof, &requirement);

    // Counter is never consulted nor written for unlimited requirements
    assert_eq!(client.get_entries(&3, &proof).entry_count, 0);
}

#[test]
fn test_record_entry_enforces_limit() {
    let env = Env::default();
    env.mock_all_auths();

    let (client, _orchestrator) = setup_contract(&env);

    let proof = QualificationProof::Nft(1);
    let requirement = token_requirement(&env, 2);

    client.record_entry(&3, &proof, &requirement);
    assert_eq!(client.get_entries(&3, &proof).entry_count, 1);

    client.record_entry(&3, &proof, &requirement);
    assert_eq!(client.get_entries(&3, &proof).entry_count, 2);

    let result = client.try_record_entry(&3, &proof, &requirement);
    assert_eq!(result, Err(Ok(Error::LimitExhausted)));

    // Failed attempt leaves the counter untouched
    assert_eq!(client.get_entries(&3, &proof).entry_count, 2);
}

#[test]
fn test_record_entry_counts_per_tournament() {
    let env = Env::default();
    env.mock_all_auths();

    let (client, _orchestrator) = setup_contract(&env);

    let proof = QualificationProof::Nft(8);
    let requirement = token_requirement(&env, 5);

    client.record_entry(&1, &proof, &requirement);
    client.record_entry(&1, &proof, &requirement);
    client.record_entry(&2, &proof, &requirement);

    assert_eq!(client.get_entries(&1, &proof).entry_count, 2);
    assert_eq!(client.get_entries(&2, &proof).entry_count, 1);
}

#[test]
fn test_entries_key_is_canonical() {
    let env = Env::default();
    env.mock_all_auths();

    let (client, _orchestrator) = setup_contract(&env);

    // Two independently constructed but equal proofs hit the same row
    let written = QualificationProof::Extension(vec![&env, 10u128, 42u128, 2u128]);
    client.set_entries(&QualificationEntries {
        tournament_id: 6,
        proof: written,
        entry_count: 3,
    });

    let looked_up = QualificationProof::Extension(vec![&env, 10u128, 42u128, 2u128]);
    assert_eq!(client.get_entries(&6, &looked_up).entry_count, 3);

    // The hash is order-sensitive: a permuted payload is a different row
    let permuted = QualificationProof::Extension(vec![&env, 2u128, 42u128, 10u128]);
    assert_eq!(client.get_entries(&6, &permuted).entry_count, 0);
}

#[test]
fn test_record_entry_before_initialize() {
    let env = Env::default();
    env.mock_all_auths();

    let contract_id = env.register_contract(None, QualificationLedger);
    let client = QualificationLedgerClient::new(&env, &contract_id);

    let result = client.try_record_entry(
        &1,
        &QualificationProof::Nft(1),
        &token_requirement(&env, 1),
    );
    assert_eq!(result, Err(Ok(Error::NotInitialized)));
}

#[test]
fn test_mutation_requires_orchestrator_auth() {
    let env = Env::default();
    env.mock_all_auths();

    let (client, _orchestrator) = setup_contract(&env);

    // Drop the auth mocks: unauthenticated mutation must be rejected
    env.set_auths(&[]);

    let result = client.try_set_requirement(&1, &Some(token_requirement(&env, 1)));
    assert!(result.is_err());

    let result = client.try_record_entry(
        &1,
        &QualificationProof::Nft(1),
        &token_requirement(&env, 1),
    );
    assert!(result.is_err());

    // Reads stay open
    assert_eq!(client.get_requirement(&1), None);
}
