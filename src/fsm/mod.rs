//! Function-pointer finite state machine engine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌────────────┬───────────┬──────────┬───────────────────┐   │
//! │  │ StateId    │ on_enter  │ on_exit  │ on_update         │   │
//! │  ├────────────┼───────────┼──────────┼───────────────────┤   │
//! │  │ Starting   │ -         │ -        │ fn(ctx)->Option<> │   │
//! │  │ VotingMode │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  │ Processing │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  │ Halted     │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  └────────────┴───────────┴──────────┴───────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each step the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  The voting loop steps the machine only at the
//! points where something happened (boot probe done, voter matched,
//! outcome known), not on every loop iteration.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// States of the polling terminal.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Starting = 0,
    VotingMode = 1,
    Processing = 2,
    Halted = 3,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert an index back to `StateId`.  Out-of-range indices assert in
    /// debug builds and map to `Halted` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Starting,
            1 => Self::VotingMode,
            2 => Self::Processing,
            3 => Self::Halted,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Halted
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-step update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `step()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Run `on_update` for the current state and follow the transition
    /// it returns, if any.  Returns the state after the step.
    pub fn step(&mut self, ctx: &mut FsmContext) -> StateId {
        if let Some(next_id) = (self.table[self.current].on_update)(ctx) {
            self.transition(next_id, ctx);
        }
        self.current_state()
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
