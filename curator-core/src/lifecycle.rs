//! Insight status state machine
//!
//! ```text
//! pending ──► approved ──► applied ──► rolled_back
//!    │
//!    ├──► rejected
//!    └──► superseded
//! ```
//!
//! The table below is the only place transitions are defined. The record
//! store's guards, the approve/reject workflow and the admin routes all
//! consult it through [`validate_transition`], [`predecessors`] and
//! [`is_editable`].

use crate::{InsightStatus, LifecycleError};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static TRANSITIONS: Lazy<HashMap<InsightStatus, &'static [InsightStatus]>> = Lazy::new(|| {
    use InsightStatus::*;
    HashMap::from([
        (Pending, &[Approved, Rejected, Superseded][..]),
        (Approved, &[Applied][..]),
        (Applied, &[RolledBack][..]),
        (Rejected, &[][..]),
        (Superseded, &[][..]),
        (RolledBack, &[][..]),
    ])
});

/// Statuses reachable in one step from `from`.
pub fn allowed_transitions(from: InsightStatus) -> &'static [InsightStatus] {
    TRANSITIONS.get(&from).copied().unwrap_or(&[])
}

/// Whether `from -> to` is an edge of the state machine. Self-loops never are.
pub fn can_transition(from: InsightStatus, to: InsightStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Check a status change against the state machine.
pub fn validate_transition(from: InsightStatus, to: InsightStatus) -> Result<(), LifecycleError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition { from, to })
    }
}

/// Whether no transition leaves `status`.
pub fn is_terminal(status: InsightStatus) -> bool {
    allowed_transitions(status).is_empty()
}

/// Statuses with an edge into `to`.
pub fn predecessors(to: InsightStatus) -> Vec<InsightStatus> {
    InsightStatus::ALL
        .into_iter()
        .filter(|from| can_transition(*from, to))
        .collect()
}

/// Whether text, category and confidence may still be edited.
///
/// Only an `applied` insight is frozen; its text is what the catalog holds.
pub fn is_editable(status: InsightStatus) -> bool {
    status != InsightStatus::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use InsightStatus::*;

    fn arb_status() -> impl Strategy<Value = InsightStatus> {
        proptest::sample::select(InsightStatus::ALL.to_vec())
    }

    #[test]
    fn test_listed_edges_are_allowed() {
        for (from, to) in [
            (Pending, Approved),
            (Pending, Rejected),
            (Pending, Superseded),
            (Approved, Applied),
            (Applied, RolledBack),
        ] {
            assert!(validate_transition(from, to).is_ok(), "{from} -> {to}");
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(is_terminal(Rejected));
        assert!(is_terminal(Superseded));
        assert!(is_terminal(RolledBack));
        assert!(!is_terminal(Pending));
        assert!(!is_terminal(Approved));
        assert!(!is_terminal(Applied));
    }

    #[test]
    fn test_error_message_names_both_states() {
        let err = validate_transition(Approved, Approved).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid status transition from approved to approved"
        );
    }

    #[test]
    fn test_only_approved_leads_to_applied() {
        assert_eq!(predecessors(Applied), vec![Approved]);
        assert_eq!(predecessors(Approved), vec![Pending]);
        assert!(predecessors(Pending).is_empty());
    }

    #[test]
    fn test_applied_insights_are_frozen() {
        assert!(!is_editable(Applied));
        for status in [Pending, Approved, Rejected, Superseded, RolledBack] {
            assert!(is_editable(status), "{status}");
        }
    }

    #[test]
    fn test_cannot_skip_review() {
        assert!(!can_transition(Pending, Applied));
        assert!(!can_transition(Rejected, Approved));
    }

    proptest! {
        #[test]
        fn prop_self_transitions_always_fail(s in arb_status()) {
            prop_assert!(validate_transition(s, s).is_err());
        }

        #[test]
        fn prop_exactly_five_edges(from in arb_status(), to in arb_status()) {
            let expected = matches!(
                (from, to),
                (Pending, Approved)
                    | (Pending, Rejected)
                    | (Pending, Superseded)
                    | (Approved, Applied)
                    | (Applied, RolledBack)
            );
            prop_assert_eq!(can_transition(from, to), expected);
        }
    }
}
