//! Transfer State Machine
//!
//! ```text
//! STARTED → VALIDATING_SENDER → VALIDATING_RECEIVER → DEBITING → CREDITING → COMMITTING → COMMITTED
//!    │              │                    │                │           │            │
//!    └──────────────┴────────────────────┴────────────────┴───────────┴────────────┴──→ ROLLED_BACK
//! ```
//!
//! One state machine runs per transaction attempt. Terminal: COMMITTED, ROLLED_BACK.

use std::fmt;
use tracing::debug;

use super::error::TransferError;
use crate::account::AccountId;
use crate::money::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    /// Transaction opened, nothing read yet
    Started,
    /// Sender row locked; existence and sufficiency being checked
    ValidatingSender,
    ValidatingReceiver,
    Debiting,
    Crediting,
    Committing,
    /// Terminal: both rows updated and durable
    Committed,
    /// Terminal: transaction aborted, no mutation survives
    RolledBack,
}

impl TransferState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Committed | TransferState::RolledBack)
    }

    /// The only forward successor, if any
    pub fn next(&self) -> Option<TransferState> {
        match self {
            TransferState::Started => Some(TransferState::ValidatingSender),
            TransferState::ValidatingSender => Some(TransferState::ValidatingReceiver),
            TransferState::ValidatingReceiver => Some(TransferState::Debiting),
            TransferState::Debiting => Some(TransferState::Crediting),
            TransferState::Crediting => Some(TransferState::Committing),
            TransferState::Committing => Some(TransferState::Committed),
            TransferState::Committed | TransferState::RolledBack => None,
        }
    }

    /// Forward by one step, or to ROLLED_BACK from any non-terminal state
    pub fn can_transition_to(&self, to: TransferState) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == TransferState::RolledBack || self.next() == Some(to)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Started => "STARTED",
            TransferState::ValidatingSender => "VALIDATING_SENDER",
            TransferState::ValidatingReceiver => "VALIDATING_RECEIVER",
            TransferState::Debiting => "DEBITING",
            TransferState::Crediting => "CREDITING",
            TransferState::Committing => "COMMITTING",
            TransferState::Committed => "COMMITTED",
            TransferState::RolledBack => "ROLLED_BACK",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State tracker for a single transfer attempt
#[derive(Debug)]
pub struct TransferProgress {
    from: AccountId,
    to: AccountId,
    amount: Amount,
    attempt: u32,
    state: TransferState,
}

impl TransferProgress {
    pub fn new(from: AccountId, to: AccountId, amount: Amount, attempt: u32) -> Self {
        Self {
            from,
            to,
            amount,
            attempt,
            state: TransferState::Started,
        }
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Move to `next`, rejecting anything but the single forward step
    pub fn advance(&mut self, next: TransferState) -> Result<(), TransferError> {
        if next == TransferState::RolledBack || !self.state.can_transition_to(next) {
            return Err(TransferError::InvalidStateTransition {
                from: self.state,
                to: next,
            });
        }
        self.transition(next);
        Ok(())
    }

    /// Abort from wherever we are; no-op once terminal
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.transition(TransferState::RolledBack);
        }
    }

    fn transition(&mut self, next: TransferState) {
        debug!(
            from = self.from,
            to = self.to,
            amount = %self.amount,
            attempt = self.attempt,
            state = %next,
            prev = %self.state,
            "Transfer state transition"
        );
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAPPY_PATH: [TransferState; 6] = [
        TransferState::ValidatingSender,
        TransferState::ValidatingReceiver,
        TransferState::Debiting,
        TransferState::Crediting,
        TransferState::Committing,
        TransferState::Committed,
    ];

    #[test]
    fn test_terminal_states() {
        assert!(TransferState::Committed.is_terminal());
        assert!(TransferState::RolledBack.is_terminal());

        assert!(!TransferState::Started.is_terminal());
        assert!(!TransferState::Debiting.is_terminal());
        assert!(!TransferState::Committing.is_terminal());
    }

    #[test]
    fn test_happy_path_order() {
        let mut progress = TransferProgress::new(1, 2, Amount::from_major(200), 1);
        for next in HAPPY_PATH {
            progress.advance(next).unwrap();
        }
        assert_eq!(progress.state(), TransferState::Committed);
    }

    #[test]
    fn test_cannot_skip_steps() {
        let mut progress = TransferProgress::new(1, 2, Amount::from_major(200), 1);
        let err = progress.advance(TransferState::Debiting).unwrap_err();
        assert!(matches!(
            err,
            TransferError::InvalidStateTransition {
                from: TransferState::Started,
                to: TransferState::Debiting,
            }
        ));
        assert_eq!(progress.state(), TransferState::Started);
    }

    #[test]
    fn test_fail_from_any_non_terminal_state() {
        for steps in 0..6 {
            let mut progress = TransferProgress::new(1, 2, Amount::from_major(1), 1);
            for next in &HAPPY_PATH[..steps] {
                progress.advance(*next).unwrap();
            }
            progress.fail();
            assert_eq!(progress.state(), TransferState::RolledBack);
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut progress = TransferProgress::new(1, 2, Amount::from_major(1), 1);
        progress.fail();
        assert!(progress.advance(TransferState::ValidatingSender).is_err());

        let mut committed = TransferProgress::new(1, 2, Amount::from_major(1), 1);
        for next in HAPPY_PATH {
            committed.advance(next).unwrap();
        }
        committed.fail();
        assert_eq!(committed.state(), TransferState::Committed);
        assert!(!TransferState::Committed.can_transition_to(TransferState::RolledBack));
    }

    #[test]
    fn test_advance_rejects_rollback() {
        // RolledBack is reached through fail(), never advance()
        let mut progress = TransferProgress::new(1, 2, Amount::from_major(1), 1);
        assert!(progress.advance(TransferState::RolledBack).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TransferState::Started.to_string(), "STARTED");
        assert_eq!(TransferState::ValidatingSender.to_string(), "VALIDATING_SENDER");
        assert_eq!(TransferState::RolledBack.to_string(), "ROLLED_BACK");
    }
}
