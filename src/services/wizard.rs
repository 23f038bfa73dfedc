//! Wizard orchestration
//!
//! Glues the gate, the parser, the flag store and the contacts API together.
//! The gate decides, this module executes: each operation derives the
//! current state, asks the gate for a transition, and then performs the
//! returned effects in order. Network effects run first; flag writes only
//! happen after the server has confirmed, so an interrupted operation leaves
//! local flags consistent with the last confirmed server state.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::gate::flags::{FlagStore, StoredFlags};
use crate::gate::{self, Effect, GateInputs, GateState, GateViolation, Transition};
use crate::ingest::{self, phone, ParseError};
use crate::services::contacts_api::{ApiError, ContactsBackend};
use crate::types::{Contact, CreateContactRequest, UploadStatus, UploadSummary};

/// Anything a wizard operation can fail with. Parse, gate and upstream
/// failures stay distinct so the caller can report them accordingly.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Gate(#[from] GateViolation),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Failed to persist wizard state: {0}")]
    Flags(#[from] std::io::Error),
}

/// Current view over the wizard, reported by the `status` command.
#[derive(Debug, Clone)]
pub struct WizardStatus {
    pub state: GateState,
    pub server: UploadStatus,
    pub flags: StoredFlags,
}

/// Drives the upload wizard against a contacts backend and a local flag
/// store.
pub struct Wizard<B: ContactsBackend> {
    backend: B,
    flags: FlagStore,
}

impl<B: ContactsBackend> Wizard<B> {
    pub fn new(backend: B, flags: FlagStore) -> Self {
        Self { backend, flags }
    }

    /// Query the server and local flags and derive the gate state.
    pub async fn status(&self) -> Result<WizardStatus, WizardError> {
        let server = self.backend.upload_status().await?;
        let flags = self.flags.load();
        let state = GateState::derive(&GateInputs {
            server_has_contacts: server.has_contacts(),
            flags: flags.clone(),
        });
        Ok(WizardStatus {
            state,
            server,
            flags,
        })
    }

    /// Bulk-upload a spreadsheet, replacing the server contact set.
    ///
    /// The gate is consulted before the file is even parsed, and certainly
    /// before any network call. Parse failures and gate violations therefore
    /// never touch the server or the persisted flags.
    pub async fn upload_file(&self, path: &Path) -> Result<UploadSummary, WizardError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let state = self.status().await?.state;
        let transition = gate::begin_upload(state, &file_name)?;

        let parsed = ingest::parse_file(path)?;
        info!(
            file = %file_name,
            contacts = parsed.contacts.len(),
            rejected = parsed.error_count(),
            "spreadsheet parsed"
        );

        self.apply(&transition, Some(&parsed.contacts)).await?;

        Ok(UploadSummary {
            file_name,
            imported_count: parsed.contacts.len(),
            rejected_count: parsed.error_count(),
            row_errors: parsed.errors,
        })
    }

    /// Delete every server contact and reset the gate to `Empty`.
    pub async fn clear_all(&self) -> Result<(), WizardError> {
        let state = self.status().await?.state;
        let transition = gate::clear_all(state)?;
        self.apply(&transition, None).await
    }

    /// Advance into the send-message step, locking the contact list on this
    /// device. The lock is device-local: when the persisted flags already
    /// decide the state, the server is not consulted, so advancing keeps
    /// working while the backend is unreachable. The status query only
    /// happens when the flags are all clear and server contacts could still
    /// make the state `UploadedUnlocked`.
    pub async fn advance_to_send(&self) -> Result<GateState, WizardError> {
        let flags = self.flags.load();
        let state = if flags.locked_step_reached || flags.uploaded_once {
            GateState::derive(&GateInputs {
                server_has_contacts: false,
                flags,
            })
        } else {
            self.status().await?.state
        };

        let transition = gate::advance_to_send(state)?;
        self.apply(&transition, None).await?;
        Ok(transition.next)
    }

    /// Add a single contact. Exempt from the gate in every state, but the
    /// phone still goes through the same normalizer as the bulk pipeline.
    pub async fn add_contact(
        &self,
        name: &str,
        raw_phone: &str,
        email: Option<&str>,
    ) -> Result<Contact, WizardError> {
        let normalized = phone::normalize(raw_phone);
        if !phone::is_valid(&normalized) {
            return Err(WizardError::InvalidPhone);
        }

        let request = CreateContactRequest {
            name: name.trim().to_string(),
            phone: normalized,
            email: email.map(|e| e.trim().to_string()),
        };
        Ok(self.backend.create_contact(&request).await?)
    }

    /// List the server contact set.
    pub async fn list_contacts(&self) -> Result<Vec<Contact>, WizardError> {
        Ok(self.backend.list_contacts().await?)
    }

    /// Execute a transition's effects in order. An upstream failure aborts
    /// before any flag write, leaving local state untouched.
    async fn apply(
        &self,
        transition: &Transition,
        contacts: Option<&[crate::types::ContactRecord]>,
    ) -> Result<(), WizardError> {
        for effect in &transition.effects {
            match effect {
                Effect::ReplaceServerContacts => {
                    self.backend
                        .replace_all(contacts.unwrap_or_default())
                        .await?;
                }
                Effect::DeleteServerContacts => {
                    self.backend.delete_all().await?;
                }
                Effect::PersistUploadFlags { file_name } => {
                    let mut flags = self.flags.load();
                    flags.uploaded_once = true;
                    flags.last_uploaded_file_name = Some(file_name.clone());
                    self.flags.save(&flags)?;
                }
                Effect::ClearFlags => {
                    self.flags.clear()?;
                }
                Effect::PersistLockFlag => {
                    let mut flags = self.flags.load();
                    flags.locked_step_reached = true;
                    self.flags.save(&flags)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::StatusCode;

    use crate::types::{ContactRecord, UploadStatus};

    /// In-memory backend recording every call it receives.
    #[derive(Default)]
    struct MockBackend {
        contacts: Mutex<Vec<ContactRecord>>,
        calls: Mutex<Vec<&'static str>>,
        fail_replace: bool,
        fail_status: bool,
        report_empty: bool,
    }

    impl MockBackend {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContactsBackend for MockBackend {
        async fn upload_status(&self) -> Result<UploadStatus, ApiError> {
            self.calls.lock().unwrap().push("status");
            if self.fail_status {
                return Err(ApiError::Server {
                    status: StatusCode::BAD_GATEWAY,
                    message: "upstream unavailable".to_string(),
                });
            }
            let count = if self.report_empty {
                0
            } else {
                self.contacts.lock().unwrap().len() as i64
            };
            Ok(UploadStatus {
                has_uploaded: count > 0,
                contacts_count: count,
            })
        }

        async fn replace_all(&self, contacts: &[ContactRecord]) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push("replace");
            if self.fail_replace {
                return Err(ApiError::Server {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "boom".to_string(),
                });
            }
            *self.contacts.lock().unwrap() = contacts.to_vec();
            Ok(())
        }

        async fn delete_all(&self) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push("delete");
            self.contacts.lock().unwrap().clear();
            Ok(())
        }

        async fn create_contact(
            &self,
            request: &CreateContactRequest,
        ) -> Result<Contact, ApiError> {
            self.calls.lock().unwrap().push("create");
            Ok(Contact {
                id: "1".to_string(),
                name: request.name.clone(),
                phone: request.phone.clone(),
                email: request.email.clone(),
            })
        }

        async fn list_contacts(&self) -> Result<Vec<Contact>, ApiError> {
            self.calls.lock().unwrap().push("list");
            Ok(vec![])
        }
    }

    fn wizard_in(dir: &Path, backend: MockBackend) -> Wizard<MockBackend> {
        Wizard::new(backend, FlagStore::new(dir))
    }

    fn write_csv(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    const VALID_CSV: &str = "Name,Phone\nAlice,01234567890\nBob,01234567891\n";

    #[tokio::test]
    async fn test_upload_transitions_empty_to_unlocked() {
        let dir = tempfile::tempdir().unwrap();
        let wizard = wizard_in(dir.path(), MockBackend::default());
        let csv = write_csv(dir.path(), "contacts.csv", VALID_CSV);

        let summary = wizard.upload_file(&csv).await.unwrap();
        assert_eq!(summary.imported_count, 2);
        assert_eq!(summary.rejected_count, 0);
        assert_eq!(summary.file_name, "contacts.csv");

        let status = wizard.status().await.unwrap();
        assert_eq!(status.state, GateState::UploadedUnlocked);
        assert!(status.flags.uploaded_once);
        assert_eq!(
            status.flags.last_uploaded_file_name.as_deref(),
            Some("contacts.csv")
        );
    }

    #[tokio::test]
    async fn test_second_upload_rejected_without_replace_call() {
        let dir = tempfile::tempdir().unwrap();
        let wizard = wizard_in(dir.path(), MockBackend::default());
        let csv = write_csv(dir.path(), "contacts.csv", VALID_CSV);

        wizard.upload_file(&csv).await.unwrap();
        let replace_calls = |w: &Wizard<MockBackend>| {
            w.backend.calls().iter().filter(|c| **c == "replace").count()
        };
        assert_eq!(replace_calls(&wizard), 1);

        let err = wizard.upload_file(&csv).await.unwrap_err();
        assert!(matches!(
            err,
            WizardError::Gate(GateViolation::AlreadyUploaded)
        ));
        // One-time policy: the replace API was never hit a second time.
        assert_eq!(replace_calls(&wizard), 1);
    }

    #[tokio::test]
    async fn test_clear_then_upload_permitted_again() {
        let dir = tempfile::tempdir().unwrap();
        let wizard = wizard_in(dir.path(), MockBackend::default());
        let csv = write_csv(dir.path(), "contacts.csv", VALID_CSV);

        wizard.upload_file(&csv).await.unwrap();
        wizard.clear_all().await.unwrap();

        let status = wizard.status().await.unwrap();
        assert_eq!(status.state, GateState::Empty);
        assert!(!status.flags.uploaded_once);

        // A fresh upload goes through.
        wizard.upload_file(&csv).await.unwrap();
        assert_eq!(
            wizard.status().await.unwrap().state,
            GateState::UploadedUnlocked
        );
    }

    #[tokio::test]
    async fn test_advance_locks_clear_rejected_without_delete_call() {
        let dir = tempfile::tempdir().unwrap();
        let wizard = wizard_in(dir.path(), MockBackend::default());
        let csv = write_csv(dir.path(), "contacts.csv", VALID_CSV);

        wizard.upload_file(&csv).await.unwrap();
        let next = wizard.advance_to_send().await.unwrap();
        assert_eq!(next, GateState::UploadedLocked);

        let err = wizard.clear_all().await.unwrap_err();
        assert!(matches!(err, WizardError::Gate(GateViolation::StepLocked)));
        assert!(!wizard.backend.calls().contains(&"delete"));
    }

    #[tokio::test]
    async fn test_locked_survives_out_of_band_server_deletion() {
        let dir = tempfile::tempdir().unwrap();

        {
            let wizard = wizard_in(dir.path(), MockBackend::default());
            let csv = write_csv(dir.path(), "contacts.csv", VALID_CSV);
            wizard.upload_file(&csv).await.unwrap();
            wizard.advance_to_send().await.unwrap();
        }

        // New session against a server that now reports zero contacts.
        let backend = MockBackend {
            report_empty: true,
            ..Default::default()
        };
        let wizard = wizard_in(dir.path(), backend);

        let status = wizard.status().await.unwrap();
        assert_eq!(status.state, GateState::UploadedLocked);

        let err = wizard.clear_all().await.unwrap_err();
        assert!(matches!(err, WizardError::Gate(GateViolation::StepLocked)));
        assert!(!wizard.backend.calls().contains(&"delete"));
    }

    #[tokio::test]
    async fn test_advance_works_offline_once_uploaded_flag_is_set() {
        let dir = tempfile::tempdir().unwrap();

        // A previous session completed the one-time upload on this device.
        FlagStore::new(dir.path())
            .save(&StoredFlags {
                uploaded_once: true,
                ..Default::default()
            })
            .unwrap();

        // The backend is unreachable; the lock is device-local state and
        // must not depend on a status round-trip.
        let backend = MockBackend {
            fail_status: true,
            ..Default::default()
        };
        let wizard = wizard_in(dir.path(), backend);

        let next = wizard.advance_to_send().await.unwrap();
        assert_eq!(next, GateState::UploadedLocked);
        assert!(!wizard.backend.calls().contains(&"status"));

        let flags = FlagStore::new(dir.path()).load();
        assert!(flags.locked_step_reached);
    }

    #[tokio::test]
    async fn test_advance_queries_server_only_when_flags_are_clear() {
        let dir = tempfile::tempdir().unwrap();
        let wizard = wizard_in(dir.path(), MockBackend::default());

        // No local flags and no server contacts: the status query runs and
        // the gate still rejects the advance.
        let err = wizard.advance_to_send().await.unwrap_err();
        assert!(matches!(
            err,
            WizardError::Gate(GateViolation::NothingUploaded)
        ));
        assert!(wizard.backend.calls().contains(&"status"));
    }

    #[tokio::test]
    async fn test_upstream_failure_leaves_flags_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockBackend {
            fail_replace: true,
            ..Default::default()
        };
        let wizard = wizard_in(dir.path(), backend);
        let csv = write_csv(dir.path(), "contacts.csv", VALID_CSV);

        let err = wizard.upload_file(&csv).await.unwrap_err();
        assert!(matches!(err, WizardError::Api(ApiError::Server { .. })));

        // No partial state commit: flags never got written.
        let flags = FlagStore::new(dir.path()).load();
        assert_eq!(flags, StoredFlags::default());
    }

    #[tokio::test]
    async fn test_parse_failure_never_touches_the_server() {
        let dir = tempfile::tempdir().unwrap();
        let wizard = wizard_in(dir.path(), MockBackend::default());
        let csv = write_csv(dir.path(), "bad.csv", "Name,Phone\nA,123\n");

        let err = wizard.upload_file(&csv).await.unwrap_err();
        assert!(matches!(
            err,
            WizardError::Parse(ParseError::NoValidContacts)
        ));
        assert!(!wizard.backend.calls().contains(&"replace"));
    }

    #[tokio::test]
    async fn test_manual_add_allowed_while_locked() {
        let dir = tempfile::tempdir().unwrap();
        let wizard = wizard_in(dir.path(), MockBackend::default());
        let csv = write_csv(dir.path(), "contacts.csv", VALID_CSV);

        wizard.upload_file(&csv).await.unwrap();
        wizard.advance_to_send().await.unwrap();

        let contact = wizard
            .add_contact("Carol", "0123 456 7892", None)
            .await
            .unwrap();
        assert_eq!(contact.phone, "+01234567892");

        // The gate state did not change.
        assert_eq!(
            wizard.status().await.unwrap().state,
            GateState::UploadedLocked
        );
    }

    #[tokio::test]
    async fn test_manual_add_validates_phone() {
        let dir = tempfile::tempdir().unwrap();
        let wizard = wizard_in(dir.path(), MockBackend::default());

        let err = wizard.add_contact("Carol", "123", None).await.unwrap_err();
        assert!(matches!(err, WizardError::InvalidPhone));
        assert!(!wizard.backend.calls().contains(&"create"));
    }

    #[tokio::test]
    async fn test_clear_on_empty_is_a_gate_violation() {
        let dir = tempfile::tempdir().unwrap();
        let wizard = wizard_in(dir.path(), MockBackend::default());

        let err = wizard.clear_all().await.unwrap_err();
        assert!(matches!(
            err,
            WizardError::Gate(GateViolation::NothingToClear)
        ));
        assert!(!wizard.backend.calls().contains(&"delete"));
    }
}
