//! Upload-gate state machine
//!
//! Product policy allows exactly one spreadsheet bulk-import per contact
//! set, and freezes the list entirely once the user has advanced into the
//! send-message step. The gate encodes that policy as an explicit state
//! type derived per command from the server-reported upload status plus the
//! device-local persisted flags.
//!
//! Decisions and transitions here are pure: a transition returns the next
//! state plus an ordered list of `Effect`s for the caller to execute.
//! Network effects always come before flag writes, so an upstream failure
//! commits nothing locally. Violations are raised before any side effect.

pub mod flags;

use thiserror::Error;

use self::flags::StoredFlags;

/// Behavioral states of the upload gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No server contacts, no local flags. Upload allowed.
    Empty,
    /// Contacts exist (or a one-time upload happened) but the send step has
    /// not been reached. Upload blocked, clear-all available.
    UploadedUnlocked,
    /// The send step has been reached. Upload and clear-all permanently
    /// blocked on this device, whatever the server count later says.
    UploadedLocked,
}

/// Inputs the gate state is derived from.
#[derive(Debug, Clone)]
pub struct GateInputs {
    /// Server currently holds contacts.
    pub server_has_contacts: bool,
    /// Device-local persisted flags.
    pub flags: StoredFlags,
}

impl GateState {
    /// Derive the current state. The locked flag dominates: even a server
    /// count of zero (out-of-band deletion) cannot unlock a locked device.
    pub fn derive(inputs: &GateInputs) -> Self {
        if inputs.flags.locked_step_reached {
            GateState::UploadedLocked
        } else if inputs.server_has_contacts || inputs.flags.uploaded_once {
            GateState::UploadedUnlocked
        } else {
            GateState::Empty
        }
    }

    /// Whether a bulk spreadsheet upload is permitted.
    pub fn can_upload(&self) -> bool {
        matches!(self, GateState::Empty)
    }

    /// Whether clearing all server contacts is permitted.
    pub fn can_clear_all(&self) -> bool {
        matches!(self, GateState::UploadedUnlocked)
    }

    /// Manual single-contact addition is a different input path than the
    /// spreadsheet pipeline and is exempt from the gate in every state.
    pub fn can_add_manual(&self) -> bool {
        true
    }
}

/// A side effect the caller must perform to realize a transition, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace the whole server contact set with the parsed records.
    ReplaceServerContacts,
    /// Delete every server contact.
    DeleteServerContacts,
    /// Persist the one-time-upload flag and the uploaded file name.
    PersistUploadFlags { file_name: String },
    /// Remove all persisted flags.
    ClearFlags,
    /// Persist the irreversible locked-step flag.
    PersistLockFlag,
}

/// Next state plus the effects that realize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: GateState,
    pub effects: Vec<Effect>,
}

/// A forbidden action, caught before any network call. Messages are
/// user-facing and name the rule that blocked the action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateViolation {
    #[error("Contacts were already imported once. Clear the existing list before uploading a new file.")]
    AlreadyUploaded,

    #[error("The contact list is locked: you already advanced to the send step. Upload and clear-all are no longer available on this device.")]
    StepLocked,

    #[error("There are no contacts to clear.")]
    NothingToClear,

    #[error("Upload contacts before advancing to the send step.")]
    NothingUploaded,
}

/// Begin a bulk upload of `file_name`. Only valid from `Empty`.
pub fn begin_upload(state: GateState, file_name: &str) -> Result<Transition, GateViolation> {
    match state {
        GateState::Empty => Ok(Transition {
            next: GateState::UploadedUnlocked,
            effects: vec![
                Effect::ReplaceServerContacts,
                Effect::PersistUploadFlags {
                    file_name: file_name.to_string(),
                },
            ],
        }),
        GateState::UploadedUnlocked => Err(GateViolation::AlreadyUploaded),
        GateState::UploadedLocked => Err(GateViolation::StepLocked),
    }
}

/// Clear all server contacts, returning the gate to `Empty`.
pub fn clear_all(state: GateState) -> Result<Transition, GateViolation> {
    match state {
        GateState::UploadedUnlocked => Ok(Transition {
            next: GateState::Empty,
            effects: vec![Effect::DeleteServerContacts, Effect::ClearFlags],
        }),
        GateState::UploadedLocked => Err(GateViolation::StepLocked),
        GateState::Empty => Err(GateViolation::NothingToClear),
    }
}

/// Advance past the upload step into the send-message step. One-directional:
/// re-advancing from a locked state is a no-op rather than an error.
pub fn advance_to_send(state: GateState) -> Result<Transition, GateViolation> {
    match state {
        GateState::UploadedUnlocked => Ok(Transition {
            next: GateState::UploadedLocked,
            effects: vec![Effect::PersistLockFlag],
        }),
        GateState::UploadedLocked => Ok(Transition {
            next: GateState::UploadedLocked,
            effects: vec![],
        }),
        GateState::Empty => Err(GateViolation::NothingUploaded),
    }
}
