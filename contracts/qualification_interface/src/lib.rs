#![no_std]

//! Shared protocol surface for tournament entry qualification.
//!
//! Three parties meet here:
//!
//! - The **orchestrator** owns tournaments and registrations. It stores an
//!   [`EntryRequirement`] per tournament and, for the `Extension` kind,
//!   dispatches eligibility decisions to a validator contract by address.
//! - A **validator** is any contract exporting the [`EntryValidator`]
//!   functions. The orchestrator talks to it through
//!   [`EntryValidatorClient`]; implementations are interchangeable.
//! - A validator that judges eligibility from other tournaments' results
//!   reads the orchestrator back through [`OrchestratorClient`].
//!
//! Payloads crossing the boundary (`ExtensionConfig::config`, the
//! `Extension` proof) are ordered `u128` sequences whose meaning belongs to
//! the validator alone. Neither the orchestrator nor the qualification
//! ledger interprets them.

use soroban_sdk::{contractclient, contracttype, Address, Env, Vec};

//
// ──────────────────────────────────────────────────────────
// REQUIREMENTS
// ──────────────────────────────────────────────────────────
//

/// Entry gate attached to a tournament at creation time.
///
/// `entry_limit = 0` means unlimited entries per qualifying proof.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryRequirement {
    pub entry_limit: u32,
    pub kind: EntryRequirementKind,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntryRequirementKind {
    /// Hold a balance of the given token.
    Token(Address),
    /// Be one of the listed addresses.
    Allowlist(Vec<Address>),
    /// Defer to an external validator contract.
    Extension(ExtensionConfig),
}

/// Validator address plus an opaque configuration payload.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtensionConfig {
    pub validator: Address,
    pub config: Vec<u128>,
}

/// Caller-supplied evidence that a requirement is met.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QualificationProof {
    /// A game token id, for token-gated requirements.
    Nft(u64),
    /// An address, for allowlist requirements.
    Address(Address),
    /// Validator-owned payload, for extension requirements.
    Extension(Vec<u128>),
}

//
// ──────────────────────────────────────────────────────────
// ORCHESTRATOR READ VIEWS
// ──────────────────────────────────────────────────────────
//

/// Tournament lifecycle. A leaderboard is only immutable once the
/// tournament reaches `Finalized`.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Scheduled = 0,
    Registration = 1,
    Staging = 2,
    Live = 3,
    Submission = 4,
    Finalized = 5,
}

/// Registration record of one game token in one tournament.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Registration {
    pub tournament_id: u64,
    pub entry_number: u32,
    pub has_submitted: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TournamentInfo {
    pub id: u64,
    pub creator: Address,
    pub game_address: Address,
    pub entry_requirement: Option<EntryRequirement>,
}

/// Read views a validator consumes to evaluate qualification.
///
/// Lookups return `None` for unknown ids so validators can classify absence
/// as "not qualified" instead of aborting.
#[contractclient(name = "OrchestratorClient")]
pub trait OrchestratorViews {
    fn get_tournament(env: Env, tournament_id: u64) -> Option<TournamentInfo>;

    /// Registration of `token_id` within the given game, if any.
    fn get_registration(env: Env, game: Address, token_id: u64) -> Option<Registration>;

    /// Current owner of `token_id` within the given game, if it exists.
    fn get_owner(env: Env, game: Address, token_id: u64) -> Option<Address>;

    fn get_phase(env: Env, tournament_id: u64) -> Phase;

    /// Finalized ranking of a tournament: token ids, rank 1 first.
    fn get_leaderboard(env: Env, tournament_id: u64) -> Vec<u64>;
}

//
// ──────────────────────────────────────────────────────────
// VALIDATOR PROTOCOL
// ──────────────────────────────────────────────────────────
//

/// Capability surface every pluggable entry validator exposes.
///
/// The orchestrator is the only caller allowed to mutate: `add_config`,
/// `add_entry` and `remove_entry` must require authorization from the
/// orchestrator address the validator was initialized with. That single
/// check is the entire trust boundary of the protocol.
///
/// `proof` is the payload of [`QualificationProof::Extension`], passed
/// through verbatim. Decision functions are total: a proof the validator
/// cannot decode is "not qualified" (`false` / `Some(0)`), never an error.
#[contractclient(name = "EntryValidatorClient")]
pub trait EntryValidator {
    /// Whether `proof` qualifies `player` for a new entry into
    /// `tournament_id`.
    fn valid_entry(env: Env, tournament_id: u64, player: Address, proof: Vec<u128>) -> bool;

    /// Whether an existing entry should be banned after re-evaluation,
    /// e.g. when `token_id` changed hands.
    fn should_ban(
        env: Env,
        tournament_id: u64,
        token_id: u64,
        owner: Address,
        proof: Vec<u128>,
    ) -> bool;

    /// Remaining entries for `proof`: `None` = unlimited, `Some(0)` =
    /// exhausted or not qualified, `Some(n)` = n more entries allowed.
    fn entries_left(env: Env, tournament_id: u64, player: Address, proof: Vec<u128>)
        -> Option<u32>;

    /// Whether the validator is only consulted during the registration
    /// window.
    fn registration_only(env: Env) -> bool;

    /// Install the validator-specific configuration for a target
    /// tournament. Called exactly once per tournament, at creation.
    fn add_config(env: Env, tournament_id: u64, entry_limit: u32, config: Vec<u128>);

    /// Account a successful entry into `tournament_id`.
    fn add_entry(env: Env, tournament_id: u64, token_id: u64, player: Address, proof: Vec<u128>);

    /// Hook invoked when an entry is banned.
    fn remove_entry(
        env: Env,
        tournament_id: u64,
        token_id: u64,
        player: Address,
        proof: Vec<u128>,
    );
}
