//! Booking lifecycle state machine
//!
//! ```text
//! pending --confirm--> confirmed --start--> in-progress --complete--> completed
//!    |                     |
//!    +------cancel---------+--> cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. Applying a transition here never
//! touches storage; persisting the result is a conditional write keyed on the
//! status the transition was computed from.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{Booking, BookingStatus};

/// Operator or customer request against a booking
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    Confirm,
    Start,
    Complete,
    Cancel,
}

impl BookingAction {
    pub const ALL: [BookingAction; 4] = [
        BookingAction::Confirm,
        BookingAction::Start,
        BookingAction::Complete,
        BookingAction::Cancel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Confirm => "confirm",
            BookingAction::Start => "start",
            BookingAction::Complete => "complete",
            BookingAction::Cancel => "cancel",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "confirm" => Some(BookingAction::Confirm),
            "start" => Some(BookingAction::Start),
            "complete" => Some(BookingAction::Complete),
            "cancel" => Some(BookingAction::Cancel),
            _ => None,
        }
    }
}

impl std::fmt::Display for BookingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated status change, ready to be written as `UPDATE ... WHERE status = from`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: BookingStatus,
    pub action: BookingAction,
    pub to: BookingStatus,
}

/// Next status for `action` applied in `current`, if the table allows it
pub fn next_status(current: BookingStatus, action: BookingAction) -> Option<BookingStatus> {
    use BookingAction::*;
    use BookingStatus::*;

    match (current, action) {
        (Pending, Confirm) => Some(Confirmed),
        (Confirmed, Start) => Some(InProgress),
        (InProgress, Complete) => Some(Completed),
        (Pending | Confirmed, Cancel) => Some(Cancelled),
        _ => None,
    }
}

/// Validate `action` against a status without needing the full record
pub fn plan_transition(current: BookingStatus, action: BookingAction) -> CoreResult<Transition> {
    next_status(current, action)
        .map(|to| Transition {
            from: current,
            action,
            to,
        })
        .ok_or(CoreError::InvalidTransition {
            from: current,
            action,
        })
}

/// Validate `action` against the booking's current status
///
/// The booking is not modified; callers persist `Transition::to` with a
/// conditional write and only then update their in-memory copy.
pub fn transition(booking: &Booking, action: BookingAction) -> CoreResult<Transition> {
    plan_transition(booking.status, action)
}

/// Actions that are legal from `current`, for rendering action buttons
pub fn available_actions(current: BookingStatus) -> Vec<BookingAction> {
    BookingAction::ALL
        .into_iter()
        .filter(|action| next_status(current, *action).is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut status = BookingStatus::Pending;
        for action in [
            BookingAction::Confirm,
            BookingAction::Start,
            BookingAction::Complete,
        ] {
            status = plan_transition(status, action).unwrap().to;
        }
        assert_eq!(status, BookingStatus::Completed);
    }

    #[test]
    fn test_cancel_from_pending_and_confirmed() {
        assert_eq!(
            next_status(BookingStatus::Pending, BookingAction::Cancel),
            Some(BookingStatus::Cancelled)
        );
        assert_eq!(
            next_status(BookingStatus::Confirmed, BookingAction::Cancel),
            Some(BookingStatus::Cancelled)
        );
        assert_eq!(next_status(BookingStatus::InProgress, BookingAction::Cancel), None);
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for status in [BookingStatus::Completed, BookingStatus::Cancelled] {
            assert!(status.is_terminal());
            assert!(available_actions(status).is_empty());
            for action in BookingAction::ALL {
                assert_eq!(
                    plan_transition(status, action),
                    Err(CoreError::InvalidTransition { from: status, action })
                );
            }
        }
    }

    #[test]
    fn test_double_confirm_rejected() {
        let first = plan_transition(BookingStatus::Pending, BookingAction::Confirm).unwrap();
        assert!(plan_transition(first.to, BookingAction::Confirm).is_err());
    }

    #[test]
    fn test_available_actions() {
        assert_eq!(
            available_actions(BookingStatus::Pending),
            vec![BookingAction::Confirm, BookingAction::Cancel]
        );
        assert_eq!(
            available_actions(BookingStatus::Confirmed),
            vec![BookingAction::Start, BookingAction::Cancel]
        );
        assert_eq!(
            available_actions(BookingStatus::InProgress),
            vec![BookingAction::Complete]
        );
    }

    #[test]
    fn test_action_round_trip_names() {
        assert_eq!(BookingAction::from_str("complete"), Some(BookingAction::Complete));
        assert_eq!(BookingAction::from_str("refund"), None);
        assert_eq!(BookingStatus::from_str("in-progress"), Some(BookingStatus::InProgress));
    }
}
