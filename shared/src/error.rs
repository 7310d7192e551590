//! Errors raised by the booking core

use thiserror::Error;

use crate::models::BookingStatus;
use crate::lifecycle::BookingAction;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The action is not permitted from the booking's current status
    #[error("cannot {action} a booking that is {from}")]
    InvalidTransition {
        from: BookingStatus,
        action: BookingAction,
    },

    /// A conditional status write lost a race with another writer
    #[error("booking {booking_id} is no longer {expected}")]
    ConflictingUpdate {
        booking_id: String,
        expected: BookingStatus,
    },

    /// A stored record is missing or has an unusable required field
    #[error("malformed {record} record: {field}")]
    MalformedRecord { record: &'static str, field: String },
}

impl CoreError {
    pub fn malformed(record: &'static str, field: impl Into<String>) -> Self {
        CoreError::MalformedRecord {
            record,
            field: field.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
