#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, xdr::ToXdr, Address, Bytes,
    BytesN, Env,
};

use qualification_interface::{EntryRequirement, QualificationProof};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    LimitExhausted = 3,
}

#[contracttype]
pub enum DataKey {
    Orchestrator,          // Address - the only caller allowed to mutate
    Requirement(u64),      // EntryRequirement per tournament
    Entries(BytesN<32>),   // QualificationEntries, keyed by hashed (id, proof)
}

/// Entry counter for one (tournament, proof) pair.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QualificationEntries {
    pub tournament_id: u64,
    pub proof: QualificationProof,
    pub entry_count: u32,
}

#[contract]
pub struct QualificationLedger;

const LEDGER_THRESHOLD_SHARED: u32 = 518_400; // ~30 days @ 5s/ledger
const LEDGER_BUMP_SHARED: u32 = 1_036_800; // ~60 days @ 5s/ledger

#[contractimpl]
impl QualificationLedger {
    fn bump_persistent_ttl(env: &Env, key: &DataKey) {
        env.storage()
            .persistent()
            .extend_ttl(key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
    }

    pub fn initialize(env: Env, orchestrator: Address) -> Result<(), Error> {
        let storage = env.storage().instance();

        if storage.has(&DataKey::Orchestrator) {
            return Err(Error::AlreadyInitialized);
        }

        orchestrator.require_auth();
        storage.set(&DataKey::Orchestrator, &orchestrator);

        Ok(())
    }

    /// Replace a tournament's entry requirement wholesale.
    ///
    /// `None` clears the requirement. Replacing a requirement orphans any
    /// counters recorded under the previous one; rows are never deleted.
    pub fn set_requirement(
        env: Env,
        tournament_id: u64,
        requirement: Option<EntryRequirement>,
    ) -> Result<(), Error> {
        Self::require_orchestrator(&env)?;

        let key = DataKey::Requirement(tournament_id);
        match requirement {
            Some(req) => {
                env.storage().persistent().set(&key, &req);
                Self::bump_persistent_ttl(&env, &key);
            }
            None => env.storage().persistent().remove(&key),
        }

        env.events()
            .publish((symbol_short!("req_set"), tournament_id), ());

        Ok(())
    }

    pub fn get_requirement(env: Env, tournament_id: u64) -> Option<EntryRequirement> {
        env.storage()
            .persistent()
            .get(&DataKey::Requirement(tournament_id))
    }

    /// Counter row for `(tournament_id, proof)`; a row that was never
    /// written reads back with `entry_count = 0`.
    pub fn get_entries(env: Env, tournament_id: u64, proof: QualificationProof) -> QualificationEntries {
        let key = DataKey::Entries(Self::entries_key(&env, tournament_id, &proof));
        env.storage()
            .persistent()
            .get(&key)
            .unwrap_or(QualificationEntries {
                tournament_id,
                proof,
                entry_count: 0,
            })
    }

    /// Overwrite the counter row at the key hashed from the entries' own
    /// tournament id and proof.
    pub fn set_entries(env: Env, entries: QualificationEntries) -> Result<(), Error> {
        Self::require_orchestrator(&env)?;

        let key = DataKey::Entries(Self::entries_key(
            &env,
            entries.tournament_id,
            &entries.proof,
        ));
        env.storage().persistent().set(&key, &entries);
        Self::bump_persistent_ttl(&env, &key);

        Ok(())
    }

    /// Account one successful registration against `requirement`.
    ///
    /// Called by the orchestrator for the Token and Allowlist requirement
    /// kinds only; Extension-kind bookkeeping lives in the validator. With
    /// `entry_limit = 0` the counter is never consulted. The read, check
    /// and increment happen within a single invocation, so no other call
    /// can interleave.
    pub fn record_entry(
        env: Env,
        tournament_id: u64,
        proof: QualificationProof,
        requirement: EntryRequirement,
    ) -> Result<(), Error> {
        Self::require_orchestrator(&env)?;

        if requirement.entry_limit == 0 {
            return Ok(());
        }

        let key = DataKey::Entries(Self::entries_key(&env, tournament_id, &proof));
        let mut entries: QualificationEntries = env
            .storage()
            .persistent()
            .get(&key)
            .unwrap_or(QualificationEntries {
                tournament_id,
                proof,
                entry_count: 0,
            });

        if entries.entry_count >= requirement.entry_limit {
            return Err(Error::LimitExhausted);
        }

        entries.entry_count += 1;
        env.storage().persistent().set(&key, &entries);
        Self::bump_persistent_ttl(&env, &key);

        env.events().publish(
            (symbol_short!("entry_rec"), tournament_id),
            entries.entry_count,
        );

        Ok(())
    }

    pub fn get_orchestrator(env: Env) -> Address {
        env.storage()
            .instance()
            .get(&DataKey::Orchestrator)
            .expect("orchestrator address not set")
    }

    fn require_orchestrator(env: &Env) -> Result<Address, Error> {
        let orchestrator: Address = env
            .storage()
            .instance()
            .get(&DataKey::Orchestrator)
            .ok_or(Error::NotInitialized)?;
        orchestrator.require_auth();
        Ok(orchestrator)
    }

    // Canonical, order-sensitive key: sha256 over the XDR bytes of the
    // tournament id followed by the proof. Logically equal proofs land on
    // the same row.
    fn entries_key(env: &Env, tournament_id: u64, proof: &QualificationProof) -> BytesN<32> {
        let mut seed = Bytes::new(env);
        seed.append(&tournament_id.to_xdr(env));
        seed.append(&proof.clone().to_xdr(env));
        env.crypto().sha256(&seed).into()
    }
}

mod test;
