use soroban_sdk::{contracttype, Address, Vec};

/// What counts as qualifying evidence from another tournament.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QualifierType {
    /// Having entered the tournament with a token the claimant owns.
    Participants = 0,
    /// Having finished at a leaderboard position, checked once the
    /// tournament is finalized.
    TopPosition = 1,
}

/// How qualifying evidence across the configured tournaments combines into
/// an entry allowance.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QualifyingMode {
    /// Qualify via any one listed tournament; one shared entry pool.
    AtLeastOne = 0,
    /// Qualify via any one listed tournament; one pool per tournament.
    CumulativePerTournament = 1,
    /// Qualify in every listed tournament; one shared pool.
    All = 2,
    /// Qualify via any one listed tournament; one pool per qualifying
    /// token.
    CumulativePerEntry = 3,
    /// Participate in every listed tournament and win in at least one.
    AllParticipatedAnyTop = 4,
    /// Participate in every listed tournament; the shared pool scales with
    /// the number of tournaments.
    AllParticipatedCumulativeTop = 5,
}

/// Per-target-tournament qualification policy, immutable once installed.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModeConfig {
    pub qualifier_type: QualifierType,
    pub mode: QualifyingMode,
    /// Highest leaderboard position that still counts as a win; 0 means
    /// unbounded.
    pub top_positions_limit: u32,
    /// Ordered; multi-tournament proofs follow this order.
    pub qualifying_tournaments: Vec<u64>,
    pub entry_limit: u32,
}

#[contracttype]
pub enum DataKey {
    Orchestrator,                    // Address - the only caller allowed to mutate
    Config(u64),                     // ModeConfig per target tournament
    EntryCount(u64, Address, u64),   // u32 - (target, player, tracking key)
}
