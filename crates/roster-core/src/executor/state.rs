//! Per-operation state machine.

use std::fmt;

use serde::Serialize;

/// Lifecycle of one operation within a plan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    Pending,
    Dispatched,
    Succeeded,
    Failed,
}

impl OperationState {
    /// Check whether `self -> to` is an edge in the state graph:
    ///
    /// ```text
    /// pending    -> dispatched
    /// pending    -> failed      (rejected before reaching the store)
    /// dispatched -> succeeded
    /// dispatched -> failed
    /// ```
    ///
    /// There are no retries; nothing returns to `pending`.
    pub fn can_transition_to(self, to: OperationState) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Dispatched)
                | (Self::Pending, Self::Failed)
                | (Self::Dispatched, Self::Succeeded)
                | (Self::Dispatched, Self::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Dispatched => "dispatched",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Tracks one operation through its states.
#[derive(Debug)]
pub(crate) struct OperationRun {
    index: usize,
    state: OperationState,
}

impl OperationRun {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            state: OperationState::Pending,
        }
    }

    pub(crate) fn state(&self) -> OperationState {
        self.state
    }

    pub(crate) fn advance(&mut self, to: OperationState) {
        debug_assert!(
            self.state.can_transition_to(to),
            "invalid operation transition {} -> {}",
            self.state,
            to
        );
        tracing::trace!(index = self.index, from = %self.state, to = %to, "operation state");
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OperationState::*;

    const ALL: [OperationState; 4] = [Pending, Dispatched, Succeeded, Failed];

    #[test]
    fn valid_transitions() {
        assert!(Pending.can_transition_to(Dispatched));
        assert!(Pending.can_transition_to(Failed));
        assert!(Dispatched.can_transition_to(Succeeded));
        assert!(Dispatched.can_transition_to(Failed));
    }

    #[test]
    fn nothing_returns_to_pending() {
        for from in ALL {
            assert!(!from.can_transition_to(Pending), "{from} -> pending");
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [Succeeded, Failed] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
        assert!(!Pending.is_terminal());
        assert!(!Dispatched.is_terminal());
    }

    #[test]
    fn pending_cannot_skip_to_succeeded() {
        assert!(!Pending.can_transition_to(Succeeded));
    }

    #[test]
    fn run_walks_the_happy_path() {
        let mut run = OperationRun::new(0);
        assert_eq!(run.state(), Pending);
        run.advance(Dispatched);
        run.advance(Succeeded);
        assert!(run.state().is_terminal());
    }
}
