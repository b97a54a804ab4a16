//! Pure decision functions for order-book depth-update continuity, plus a
//! per-(symbol, market) registry that tracks the state machine driving them.

use std::collections::HashMap;

/// Exchange market kind a depth stream belongs to — the two kinds use
/// different continuity predicates for "the next delta after this one".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketKind {
    Spot,
    Futures,
}

/// Result of validating one depth-update frame against the tracked state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthDecision {
    pub valid: bool,
    /// The `prev_u`/`last_accepted_end_id` the caller should retain going
    /// forward — unchanged from the caller-supplied previous value when
    /// `valid` is false.
    pub new_prev_u: u64,
}

/// Validates the first delta applied after a snapshot was taken.
///
/// Valid iff `start_id <= snapshot_update_id <= end_id`, identically for
/// both market kinds — the snapshot's own update id must lie inside the
/// delta's covered range for the delta to pick up exactly where the
/// snapshot left off.
pub fn validate_first_depth_after_snapshot(start_id: u64, end_id: u64, snapshot_update_id: u64) -> DepthDecision {
    let valid = start_id <= snapshot_update_id && end_id >= snapshot_update_id;
    DepthDecision {
        valid,
        new_prev_u: if valid { end_id } else { snapshot_update_id },
    }
}

/// Validates a delta against the previously accepted one.
///
/// Futures streams carry their own previous-update-id (`pu`) and require it
/// to match what was last accepted. Spot streams instead require the new
/// delta's `start_id` to immediately follow the last accepted `end_id`.
pub fn validate_continuous_depth(
    market: MarketKind,
    start_id: u64,
    end_id: u64,
    message_prev_u: u64,
    last_accepted_end_id: u64,
) -> DepthDecision {
    let valid = match market {
        MarketKind::Futures => message_prev_u == last_accepted_end_id,
        MarketKind::Spot => start_id == last_accepted_end_id + 1,
    };
    DepthDecision {
        valid,
        new_prev_u: if valid { end_id } else { last_accepted_end_id },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Init,
    AwaitFirst { snapshot_update_id: u64 },
    Streaming { last_accepted_end_id: u64 },
    Resync,
}

/// Per-symbol continuity state machine: `INIT -> AWAIT_FIRST -> STREAMING`,
/// with any rejected delta dropping back to `RESYNC` until a fresh snapshot
/// restarts the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolDepthState {
    stage: Stage,
}

impl SymbolDepthState {
    pub const fn new() -> Self {
        Self { stage: Stage::Init }
    }

    pub fn on_snapshot(&mut self, snapshot_update_id: u64) {
        self.stage = Stage::AwaitFirst { snapshot_update_id };
    }

    /// Feeds one delta through the state machine, advancing (or resyncing)
    /// state as a side effect. Returns whether the delta was accepted.
    pub fn on_delta(&mut self, market: MarketKind, start_id: u64, end_id: u64, message_prev_u: u64) -> bool {
        match self.stage {
            Stage::Init => false,
            Stage::AwaitFirst { snapshot_update_id } => {
                let decision = validate_first_depth_after_snapshot(start_id, end_id, snapshot_update_id);
                if decision.valid {
                    self.stage = Stage::Streaming {
                        last_accepted_end_id: decision.new_prev_u,
                    };
                } else {
                    self.stage = Stage::Resync;
                }
                decision.valid
            }
            Stage::Streaming { last_accepted_end_id } => {
                let decision =
                    validate_continuous_depth(market, start_id, end_id, message_prev_u, last_accepted_end_id);
                if decision.valid {
                    self.stage = Stage::Streaming {
                        last_accepted_end_id: decision.new_prev_u,
                    };
                } else {
                    self.stage = Stage::Resync;
                }
                decision.valid
            }
            Stage::Resync => false,
        }
    }

    pub fn needs_snapshot(&self) -> bool {
        matches!(self.stage, Stage::Init | Stage::Resync)
    }
}

impl Default for SymbolDepthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of [`SymbolDepthState`] keyed by `(symbol, market)`, so one
/// consumer thread can track continuity for many instruments at once.
#[derive(Debug, Default)]
pub struct DepthBook {
    states: HashMap<(String, MarketKind), SymbolDepthState>,
}

impl DepthBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, symbol: &str, market: MarketKind) -> &mut SymbolDepthState {
        self.states
            .entry((symbol.to_owned(), market))
            .or_insert_with(SymbolDepthState::new)
    }

    pub fn on_snapshot(&mut self, symbol: &str, market: MarketKind, snapshot_update_id: u64) {
        self.entry(symbol, market).on_snapshot(snapshot_update_id);
    }

    pub fn on_delta(
        &mut self,
        symbol: &str,
        market: MarketKind,
        start_id: u64,
        end_id: u64,
        message_prev_u: u64,
    ) -> bool {
        self.entry(symbol, market).on_delta(market, start_id, end_id, message_prev_u)
    }

    pub fn needs_snapshot(&self, symbol: &str, market: MarketKind) -> bool {
        self.states
            .get(&(symbol.to_owned(), market))
            .is_none_or(SymbolDepthState::needs_snapshot)
    }
}
