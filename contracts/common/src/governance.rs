use soroban_sdk::{contracterror, contracttype, symbol_short, Address, Env, Symbol, Vec};

// ── Storage Keys ─────────────────────────────────────────────────────────────

const ADMIN_STATE_PREFIX: Symbol = symbol_short!("ADM_ST");
const ADMIN_LIST: Symbol = symbol_short!("ADM_LIST");

const TTL_THRESHOLD: u32 = 17_280; // ~1 day
const TTL_EXTEND_TO: u32 = 518_400; // ~30 days

// ── Administrator State ──────────────────────────────────────────────────────

/// Two-step administrator status of a single identity.
///
/// - `Absent`    – no privileges; never stored, a missing key reads as this.
/// - `Pending`   – proposed by a confirmed admin, waiting for the candidate
///                 to confirm.
/// - `Confirmed` – full administrator.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum AdminState {
    Absent = 0,
    Pending = 1,
    Confirmed = 2,
}

/// Failures of the governance state machine. Contracts fold these into their
/// own error enums through `From`.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum GovernanceError {
    Unauthorized = 1,
    NotPending = 2,
}

// ── Storage Helpers ──────────────────────────────────────────────────────────

fn state_key(who: &Address) -> (Symbol, Address) {
    (ADMIN_STATE_PREFIX, who.clone())
}

fn extend_ttl(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn write_state(env: &Env, who: &Address, state: AdminState) {
    let key = state_key(who);
    match state {
        AdminState::Absent => {
            env.storage().persistent().remove(&key);
            untrack(env, who);
        }
        _ => {
            env.storage().persistent().set(&key, &state);
            extend_ttl(env, &key);
            track(env, who);
        }
    }
}

fn track(env: &Env, who: &Address) {
    let mut members = list(env);
    if !members.contains(who) {
        members.push_back(who.clone());
        env.storage().persistent().set(&ADMIN_LIST, &members);
    }
    env.storage()
        .persistent()
        .extend_ttl(&ADMIN_LIST, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn untrack(env: &Env, who: &Address) {
    let members = list(env);
    if let Some(index) = members.first_index_of(who) {
        let mut remaining = members;
        remaining.remove(index);
        env.storage().persistent().set(&ADMIN_LIST, &remaining);
        env.storage()
            .persistent()
            .extend_ttl(&ADMIN_LIST, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

/// Returns the administrator state of `who`; unknown identities are `Absent`.
pub fn state_of(env: &Env, who: &Address) -> AdminState {
    let key = state_key(who);
    let state: Option<AdminState> = env.storage().persistent().get(&key);
    match state {
        Some(state) => {
            extend_ttl(env, &key);
            state
        }
        None => AdminState::Absent,
    }
}

/// Identities currently `Pending` or `Confirmed`, in the order they first
/// entered the registry.
pub fn list(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&ADMIN_LIST)
        .unwrap_or(Vec::new(env))
}

/// A seed set must name at least one identity and no identity twice.
pub fn is_valid_seed(admins: &Vec<Address>) -> bool {
    if admins.is_empty() {
        return false;
    }
    for (i, admin) in admins.iter().enumerate() {
        if admins.first_index_of(&admin) != Some(i as u32) {
            return false;
        }
    }
    true
}

// ── Transitions ──────────────────────────────────────────────────────────────

/// Marks every identity in `admins` as `Confirmed`. Only callable during
/// initialisation, before any other transition has happened.
pub fn seed(env: &Env, admins: &Vec<Address>) {
    for admin in admins.iter() {
        write_state(env, &admin, AdminState::Confirmed);
    }
}

/// Guard: fails with `Unauthorized` unless `caller` is `Confirmed`.
pub fn require_confirmed(env: &Env, caller: &Address) -> Result<(), GovernanceError> {
    if state_of(env, caller) != AdminState::Confirmed {
        return Err(GovernanceError::Unauthorized);
    }
    Ok(())
}

/// A confirmed admin proposes `candidate`.
///
/// Returns the candidate's state after the call. Proposing an identity that
/// is already confirmed leaves it confirmed.
pub fn propose(
    env: &Env,
    caller: &Address,
    candidate: &Address,
) -> Result<AdminState, GovernanceError> {
    require_confirmed(env, caller)?;
    if state_of(env, candidate) == AdminState::Confirmed {
        return Ok(AdminState::Confirmed);
    }
    write_state(env, candidate, AdminState::Pending);
    Ok(AdminState::Pending)
}

/// The pending candidate accepts. Nobody can confirm on another's behalf:
/// the transition only ever applies to `caller` itself.
pub fn confirm(env: &Env, caller: &Address) -> Result<(), GovernanceError> {
    if state_of(env, caller) != AdminState::Pending {
        return Err(GovernanceError::NotPending);
    }
    write_state(env, caller, AdminState::Confirmed);
    Ok(())
}

/// Drops `target` back to `Absent`.
///
/// Self-removal is always allowed, whatever the caller's own state; removing
/// anyone else requires a confirmed caller. Returns the target's prior state.
pub fn remove(
    env: &Env,
    caller: &Address,
    target: &Address,
) -> Result<AdminState, GovernanceError> {
    if caller != target {
        require_confirmed(env, caller)?;
    }
    let previous = state_of(env, target);
    if previous != AdminState::Absent {
        write_state(env, target, AdminState::Absent);
    }
    Ok(previous)
}
