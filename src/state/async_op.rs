use crate::api::ApiError;

/// Ticket identifying one started call. Completions carrying a ticket
/// older than the most recently issued one are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpToken(u64);

/// Lifecycle of a single remote call. Exactly one state holds at a time;
/// entering `Pending` replaces any prior payload.
#[derive(Debug, Clone, PartialEq)]
pub enum OpState<T> {
    Idle,
    Pending,
    Success(T),
    Failure(ApiError),
}

/// Observable wrapper around one logical remote operation.
///
/// Re-entrant: `start` may be called from any state. When calls overlap,
/// the machine exposes only the lifecycle of the most recently started
/// one: completions are applied in start order, not arrival order, so a
/// slow early call resolving late cannot overwrite the outcome of a later
/// call that already finished.
#[derive(Debug)]
pub struct AsyncOp<T> {
    seq: u64,
    state: OpState<T>,
}

impl<T> AsyncOp<T> {
    pub fn new() -> Self {
        Self {
            seq: 0,
            state: OpState::Idle,
        }
    }

    /// Begin a new call: enter `Pending` and return the token the
    /// completion must present.
    pub fn start(&mut self) -> OpToken {
        self.seq += 1;
        self.state = OpState::Pending;
        OpToken(self.seq)
    }

    /// Apply a completion. Returns whether it was applied; a completion
    /// for a superseded call is discarded and leaves the state untouched.
    pub fn complete(&mut self, token: OpToken, result: Result<T, ApiError>) -> bool {
        if token.0 != self.seq {
            return false;
        }
        self.state = match result {
            Ok(value) => OpState::Success(value),
            Err(err) => OpState::Failure(err),
        };
        true
    }

    /// Return to `Idle`, e.g. when a surfaced failure is dismissed. The
    /// token counter is untouched, so in-flight completions stay stale
    /// only if a newer call has started since they did.
    pub fn reset(&mut self) {
        self.state = OpState::Idle;
    }

    pub fn state(&self) -> &OpState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, OpState::Pending)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, OpState::Idle)
    }

    /// The current success payload, if the machine holds one.
    pub fn value(&self) -> Option<&T> {
        match &self.state {
            OpState::Success(value) => Some(value),
            _ => None,
        }
    }

    /// The current failure, if the machine holds one.
    pub fn error(&self) -> Option<&ApiError> {
        match &self.state {
            OpState::Failure(err) => Some(err),
            _ => None,
        }
    }
}

impl<T> Default for AsyncOp<T> {
    fn default() -> Self {
        Self::new()
    }
}
