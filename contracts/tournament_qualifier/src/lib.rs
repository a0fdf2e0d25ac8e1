#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, panic_with_error, symbol_short, Address, Env, Vec,
};

use qualification_interface::{EntryValidator, OrchestratorClient, Phase};

pub mod types;
use types::{DataKey, ModeConfig, QualifierType, QualifyingMode};

//
// ──────────────────────────────────────────────────────────
// ERRORS
// ──────────────────────────────────────────────────────────
//

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    AlreadyConfigured = 3,
    InvalidConfiguration = 4,
}

//
// ──────────────────────────────────────────────────────────
// CONSTANTS
// ──────────────────────────────────────────────────────────
//

// Configuration payload: [qualifier_type, mode, top_positions_limit, ids...]
const CONFIG_HEADER_LEN: u32 = 3;

// Counter partition for modes with one shared entry pool.
const TRACKING_KEY_GLOBAL: u64 = 0;

const LEDGER_THRESHOLD_SHARED: u32 = 518_400; // ~30 days @ 5s/ledger
const LEDGER_BUMP_SHARED: u32 = 1_036_800; // ~60 days @ 5s/ledger

//
// ──────────────────────────────────────────────────────────
// CONTRACT
// ──────────────────────────────────────────────────────────
//

/// Reference entry validator: qualifies players into a target tournament
/// from their participation or ranking record in other tournaments, read
/// back from the orchestrator.
#[contract]
pub struct TournamentQualifier;

#[contractimpl]
impl TournamentQualifier {
    // ───────────── INITIALIZATION ─────────────

    pub fn initialize(env: Env, orchestrator: Address) -> Result<(), Error> {
        let storage = env.storage().instance();

        if storage.has(&DataKey::Orchestrator) {
            return Err(Error::AlreadyInitialized);
        }

        orchestrator.require_auth();
        storage.set(&DataKey::Orchestrator, &orchestrator);

        Ok(())
    }

    // ───────────── VIEW FUNCTIONS ─────────────

    /// Installed qualification policy for a target tournament, if any.
    pub fn get_qualification(env: Env, tournament_id: u64) -> Option<ModeConfig> {
        env.storage()
            .persistent()
            .get(&DataKey::Config(tournament_id))
    }

    /// Raw entry counter for one (target, player, tracking key) partition.
    pub fn get_entry_count(env: Env, tournament_id: u64, player: Address, tracking_key: u64) -> u32 {
        Self::entry_count(&env, tournament_id, &player, tracking_key)
    }

    pub fn get_orchestrator(env: Env) -> Address {
        env.storage()
            .instance()
            .get(&DataKey::Orchestrator)
            .expect("orchestrator address not set")
    }

    // ───────────── INTERNAL HELPERS ─────────────

    fn bump_persistent_ttl(env: &Env, key: &DataKey) {
        env.storage()
            .persistent()
            .extend_ttl(key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
    }

    fn require_orchestrator(env: &Env) -> Address {
        let orchestrator: Address = match env.storage().instance().get(&DataKey::Orchestrator) {
            Some(address) => address,
            None => panic_with_error!(env, Error::NotInitialized),
        };
        orchestrator.require_auth();
        orchestrator
    }

    fn stored_orchestrator(env: &Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::Orchestrator)
    }

    fn config(env: &Env, tournament_id: u64) -> Option<ModeConfig> {
        env.storage()
            .persistent()
            .get(&DataKey::Config(tournament_id))
    }

    fn entry_count(env: &Env, tournament_id: u64, player: &Address, tracking_key: u64) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::EntryCount(
                tournament_id,
                player.clone(),
                tracking_key,
            ))
            .unwrap_or(0)
    }

    fn fits_u64(value: u128) -> Option<u64> {
        u64::try_from(value).ok()
    }

    fn fits_u32(value: u128) -> Option<u32> {
        u32::try_from(value).ok()
    }

    // ───────────── CONFIG & PROOF DECODING ─────────────

    fn decode_config(env: &Env, entry_limit: u32, config: &Vec<u128>) -> Option<ModeConfig> {
        // Header plus at least one qualifying tournament id
        if config.len() < CONFIG_HEADER_LEN + 1 {
            return None;
        }

        let qualifier_type = match config.get(0)? {
            0 => QualifierType::Participants,
            1 => QualifierType::TopPosition,
            _ => return None,
        };
        let mode = match config.get(1)? {
            0 => QualifyingMode::AtLeastOne,
            1 => QualifyingMode::CumulativePerTournament,
            2 => QualifyingMode::All,
            3 => QualifyingMode::CumulativePerEntry,
            4 => QualifyingMode::AllParticipatedAnyTop,
            5 => QualifyingMode::AllParticipatedCumulativeTop,
            _ => return None,
        };

        // The multi-tournament top modes fix their qualifier type: their
        // proof shapes only make sense one way round.
        match mode {
            QualifyingMode::AllParticipatedAnyTop
                if qualifier_type != QualifierType::TopPosition =>
            {
                return None
            }
            QualifyingMode::AllParticipatedCumulativeTop
                if qualifier_type != QualifierType::Participants =>
            {
                return None
            }
            _ => {}
        }

        let top_positions_limit = Self::fits_u32(config.get(2)?)?;

        let mut qualifying_tournaments = Vec::new(env);
        for value in config.slice(CONFIG_HEADER_LEN..).iter() {
            qualifying_tournaments.push_back(Self::fits_u64(value)?);
        }

        Some(ModeConfig {
            qualifier_type,
            mode,
            top_positions_limit,
            qualifying_tournaments,
            entry_limit,
        })
    }

    // Single-tournament proof: [qualifying_id, token_id] for Participants,
    // [qualifying_id, token_id, position] for TopPosition.
    fn decode_single(cfg: &ModeConfig, proof: &Vec<u128>) -> Option<(u64, u64, u32)> {
        let with_position = cfg.qualifier_type == QualifierType::TopPosition;
        let expected: u32 = if with_position { 3 } else { 2 };
        if proof.len() != expected {
            return None;
        }

        let qualifying_id = Self::fits_u64(proof.get(0)?)?;
        let token_id = Self::fits_u64(proof.get(1)?)?;
        let position = if with_position {
            Self::fits_u32(proof.get(2)?)?
        } else {
            0
        };

        Some((qualifying_id, token_id, position))
    }

    // Multi-tournament proof: one token id, or one (token id, position)
    // pair, per configured tournament, in configured order.
    fn decode_per_tournament(
        env: &Env,
        cfg: &ModeConfig,
        proof: &Vec<u128>,
        with_positions: bool,
    ) -> Option<Vec<(u64, u32)>> {
        let count = cfg.qualifying_tournaments.len();
        let stride: u32 = if with_positions { 2 } else { 1 };
        if proof.len() != count * stride {
            return None;
        }

        let mut claims = Vec::new(env);
        for i in 0..count {
            let token_id = Self::fits_u64(proof.get(i * stride)?)?;
            let position = if with_positions {
                Self::fits_u32(proof.get(i * stride + 1)?)?
            } else {
                0
            };
            claims.push_back((token_id, position));
        }

        Some(claims)
    }

    // Counter partition for a proof: shared pool, per-qualifying-tournament
    // pool, or per-qualifying-token pool, depending on the mode.
    fn tracking_key(cfg: &ModeConfig, proof: &Vec<u128>) -> Option<u64> {
        match cfg.mode {
            QualifyingMode::CumulativePerTournament => {
                Self::decode_single(cfg, proof).map(|(qualifying_id, _, _)| qualifying_id)
            }
            QualifyingMode::CumulativePerEntry => {
                Self::decode_single(cfg, proof).map(|(_, token_id, _)| token_id)
            }
            _ => Some(TRACKING_KEY_GLOBAL),
        }
    }

    // ───────────── QUALIFICATION CHECKS ─────────────

    fn check_qualification(
        env: &Env,
        orchestrator: &Address,
        cfg: &ModeConfig,
        player: &Address,
        proof: &Vec<u128>,
    ) -> bool {
        let views = OrchestratorClient::new(env, orchestrator);

        match cfg.mode {
            QualifyingMode::AtLeastOne
            | QualifyingMode::CumulativePerTournament
            | QualifyingMode::CumulativePerEntry => {
                let (qualifying_id, token_id, position) = match Self::decode_single(cfg, proof) {
                    Some(claim) => claim,
                    None => return false,
                };
                if !cfg.qualifying_tournaments.contains(&qualifying_id) {
                    return false;
                }
                let require_top = cfg.qualifier_type == QualifierType::TopPosition;
                Self::check_qualifying_entry(
                    &views,
                    cfg,
                    qualifying_id,
                    token_id,
                    position,
                    player,
                    require_top,
                )
            }
            QualifyingMode::All => {
                let require_top = cfg.qualifier_type == QualifierType::TopPosition;
                let claims = match Self::decode_per_tournament(env, cfg, proof, require_top) {
                    Some(claims) => claims,
                    None => return false,
                };
                let mut index: u32 = 0;
                for qualifying_id in cfg.qualifying_tournaments.iter() {
                    let (token_id, position) = match claims.get(index) {
                        Some(claim) => claim,
                        None => return false,
                    };
                    if !Self::check_qualifying_entry(
                        &views,
                        cfg,
                        qualifying_id,
                        token_id,
                        position,
                        player,
                        require_top,
                    ) {
                        return false;
                    }
                    index += 1;
                }
                true
            }
            QualifyingMode::AllParticipatedAnyTop => {
                let claims = match Self::decode_per_tournament(env, cfg, proof, true) {
                    Some(claims) => claims,
                    None => return false,
                };
                let mut any_top = false;
                let mut index: u32 = 0;
                for qualifying_id in cfg.qualifying_tournaments.iter() {
                    let (token_id, position) = match claims.get(index) {
                        Some(claim) => claim,
                        None => return false,
                    };
                    if position == 0 {
                        // Participation-only claim for this tournament
                        if !Self::check_qualifying_entry(
                            &views, cfg, qualifying_id, token_id, 0, player, false,
                        ) {
                            return false;
                        }
                    } else {
                        // A claimed win must verify in full; a false claim
                        // rejects the whole proof
                        if !Self::check_qualifying_entry(
                            &views, cfg, qualifying_id, token_id, position, player, true,
                        ) {
                            return false;
                        }
                        any_top = true;
                    }
                    index += 1;
                }
                any_top
            }
            QualifyingMode::AllParticipatedCumulativeTop => {
                let claims = match Self::decode_per_tournament(env, cfg, proof, false) {
                    Some(claims) => claims,
                    None => return false,
                };
                let mut index: u32 = 0;
                for qualifying_id in cfg.qualifying_tournaments.iter() {
                    let (token_id, _) = match claims.get(index) {
                        Some(claim) => claim,
                        None => return false,
                    };
                    if !Self::check_qualifying_entry(
                        &views, cfg, qualifying_id, token_id, 0, player, false,
                    ) {
                        return false;
                    }
                    index += 1;
                }
                true
            }
        }
    }

    // Shared per-tournament primitive: the token must be registered in the
    // qualifying tournament and currently owned by the claimant. With
    // `require_top`, the claimed position must additionally hold on the
    // finalized leaderboard.
    #[allow(clippy::too_many_arguments)]
    fn check_qualifying_entry(
        views: &OrchestratorClient,
        cfg: &ModeConfig,
        qualifying_id: u64,
        token_id: u64,
        position: u32,
        claimant: &Address,
        require_top: bool,
    ) -> bool {
        let tournament = match views.get_tournament(&qualifying_id) {
            Some(tournament) => tournament,
            None => return false,
        };

        let registration = match views.get_registration(&tournament.game_address, &token_id) {
            Some(registration) => registration,
            None => return false,
        };
        if registration.tournament_id != qualifying_id {
            return false;
        }

        match views.get_owner(&tournament.game_address, &token_id) {
            Some(owner) if owner == *claimant => {}
            _ => return false,
        }

        if !require_top {
            return true;
        }

        // Ranking evidence is only checked once the tournament can no
        // longer change; anything earlier classifies as not qualified.
        if views.get_phase(&qualifying_id) != Phase::Finalized {
            return false;
        }
        if !registration.has_submitted {
            return false;
        }
        if position == 0 {
            return false;
        }
        if cfg.top_positions_limit != 0 && position > cfg.top_positions_limit {
            return false;
        }

        let leaderboard = views.get_leaderboard(&qualifying_id);
        leaderboard.get(position - 1) == Some(token_id)
    }
}

//
// ──────────────────────────────────────────────────────────
// VALIDATOR PROTOCOL
// ──────────────────────────────────────────────────────────
//

#[contractimpl]
impl EntryValidator for TournamentQualifier {
    fn valid_entry(env: Env, tournament_id: u64, player: Address, proof: Vec<u128>) -> bool {
        let cfg = match Self::config(&env, tournament_id) {
            Some(cfg) => cfg,
            None => return false,
        };
        let orchestrator = match Self::stored_orchestrator(&env) {
            Some(orchestrator) => orchestrator,
            None => return false,
        };
        Self::check_qualification(&env, &orchestrator, &cfg, &player, &proof)
    }

    /// Whether transferring a qualifying token away should ban an existing
    /// entry is an open question for mode-based qualification; no policy is
    /// implemented and no entry is ever banned.
    fn should_ban(
        _env: Env,
        _tournament_id: u64,
        _token_id: u64,
        _owner: Address,
        _proof: Vec<u128>,
    ) -> bool {
        false
    }

    fn entries_left(
        env: Env,
        tournament_id: u64,
        player: Address,
        proof: Vec<u128>,
    ) -> Option<u32> {
        let cfg = match Self::config(&env, tournament_id) {
            Some(cfg) => cfg,
            None => return Some(0),
        };
        let orchestrator = match Self::stored_orchestrator(&env) {
            Some(orchestrator) => orchestrator,
            None => return Some(0),
        };

        // Not qualified (including "not yet finalized") reads as an empty
        // pool, not as an error
        if !Self::check_qualification(&env, &orchestrator, &cfg, &player, &proof) {
            return Some(0);
        }

        if cfg.entry_limit == 0 {
            return None;
        }

        let effective_limit = match cfg.mode {
            QualifyingMode::AllParticipatedCumulativeTop => cfg
                .entry_limit
                .saturating_mul(cfg.qualifying_tournaments.len()),
            _ => cfg.entry_limit,
        };

        let tracking_key = match Self::tracking_key(&cfg, &proof) {
            Some(key) => key,
            None => return Some(0),
        };

        let used = Self::entry_count(&env, tournament_id, &player, tracking_key);
        Some(effective_limit.saturating_sub(used))
    }

    fn registration_only(_env: Env) -> bool {
        true
    }

    fn add_config(env: Env, tournament_id: u64, entry_limit: u32, config: Vec<u128>) {
        Self::require_orchestrator(&env);

        let key = DataKey::Config(tournament_id);
        if env.storage().persistent().has(&key) {
            panic_with_error!(&env, Error::AlreadyConfigured);
        }

        let cfg = match Self::decode_config(&env, entry_limit, &config) {
            Some(cfg) => cfg,
            None => panic_with_error!(&env, Error::InvalidConfiguration),
        };

        env.storage().persistent().set(&key, &cfg);
        Self::bump_persistent_ttl(&env, &key);

        env.events()
            .publish((symbol_short!("qual_cfg"), tournament_id), ());
    }

    /// Accounts one successful entry. No upper-bound check happens here:
    /// the orchestrator is expected to have consulted `entries_left` first.
    fn add_entry(env: Env, tournament_id: u64, _token_id: u64, player: Address, proof: Vec<u128>) {
        Self::require_orchestrator(&env);

        let cfg = match Self::config(&env, tournament_id) {
            Some(cfg) => cfg,
            None => return,
        };
        // Unlimited pools never consult the counter; skip the write
        if cfg.entry_limit == 0 {
            return;
        }
        let tracking_key = match Self::tracking_key(&cfg, &proof) {
            Some(key) => key,
            None => return,
        };

        let key = DataKey::EntryCount(tournament_id, player.clone(), tracking_key);
        let used: u32 = env.storage().persistent().get(&key).unwrap_or(0);
        env.storage().persistent().set(&key, &(used + 1));
        Self::bump_persistent_ttl(&env, &key);

        env.events()
            .publish((symbol_short!("qual_ent"), tournament_id, player), used + 1);
    }

    /// Bans neither release nor adjust qualification entries; the counter
    /// store is append-only.
    fn remove_entry(
        env: Env,
        _tournament_id: u64,
        _token_id: u64,
        _player: Address,
        _proof: Vec<u128>,
    ) {
        Self::require_orchestrator(&env);
    }
}
