//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use crate::{Money, ParticipantSpec, SplitType};

/// Record an expense and split it across participants.
#[derive(Clone, Debug)]
pub struct CreateExpenseCmd {
    pub payer: String,
    pub amount: Money,
    pub split_type: SplitType,
    pub name: Option<String>,
    pub note: Option<String>,
    pub participants: Vec<ParticipantSpec>,
}

impl CreateExpenseCmd {
    #[must_use]
    pub fn new(payer: impl Into<String>, amount: Money, split_type: SplitType) -> Self {
        Self {
            payer: payer.into(),
            amount,
            split_type,
            name: None,
            note: None,
            participants: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn participant(mut self, participant: ParticipantSpec) -> Self {
        self.participants.push(participant);
        self
    }

    #[must_use]
    pub fn participants(mut self, participants: impl IntoIterator<Item = ParticipantSpec>) -> Self {
        self.participants.extend(participants);
        self
    }
}

/// Register a user.
#[derive(Clone, Debug, Default)]
pub struct CreateUserCmd {
    pub user_id: Option<String>,
    pub name: String,
    pub email: String,
    pub mobile_number: Option<String>,
}

impl CreateUserCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: None,
            name: name.into(),
            email: email.into(),
            mobile_number: None,
        }
    }

    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn mobile_number(mut self, mobile_number: impl Into<String>) -> Self {
        self.mobile_number = Some(mobile_number.into());
        self
    }
}
