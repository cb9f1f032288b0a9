//! Dashboard interaction state as a single tagged union.
//!
//! Only one dialog or flow is active at a time. Transitions are checked:
//! an invalid one returns a `Validation` error and leaves the state as is.

use serde::{Deserialize, Serialize};

use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::types::id::{FileId, FolderId};

/// A folder or file the dashboard acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ItemRef {
    Folder(FolderId),
    File(FileId),
}

/// What the dashboard is doing right now.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// The new-folder dialog is open.
    CreatingFolder {
        /// Name typed so far.
        draft: String,
    },
    /// An upload is streaming.
    UploadingFile {
        /// Fraction sent, in `[0, 1]`.
        progress: f64,
    },
    /// The delete confirmation is open.
    ConfirmingDelete {
        /// Item to delete.
        target: ItemRef,
        /// Name shown in the dialog.
        name: String,
        /// Whether the delete has been confirmed and is running.
        in_flight: bool,
        /// Failure of the last attempt, shown inline.
        error: Option<String>,
    },
    /// An item is being renamed in place.
    Renaming {
        /// Item being renamed.
        target: ItemRef,
        /// Name typed so far.
        draft: String,
    },
}

impl DashboardState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Opens the new-folder dialog.
    pub fn begin_create_folder(&mut self) -> AppResult<()> {
        self.require_idle("create a folder")?;
        *self = Self::CreatingFolder {
            draft: String::new(),
        };
        Ok(())
    }

    /// Starts an upload.
    pub fn begin_upload(&mut self) -> AppResult<()> {
        self.require_idle("start an upload")?;
        *self = Self::UploadingFile { progress: 0.0 };
        Ok(())
    }

    /// Opens the delete confirmation for `target`.
    pub fn request_delete(&mut self, target: ItemRef, name: impl Into<String>) -> AppResult<()> {
        self.require_idle("delete an item")?;
        *self = Self::ConfirmingDelete {
            target,
            name: name.into(),
            in_flight: false,
            error: None,
        };
        Ok(())
    }

    /// Starts renaming `target`, seeding the draft with its current name.
    pub fn begin_rename(&mut self, target: ItemRef, current_name: impl Into<String>) -> AppResult<()> {
        self.require_idle("rename an item")?;
        *self = Self::Renaming {
            target,
            draft: current_name.into(),
        };
        Ok(())
    }

    /// Replaces the draft of the open folder dialog or rename.
    pub fn edit_draft(&mut self, text: impl Into<String>) -> AppResult<()> {
        match self {
            Self::CreatingFolder { draft } | Self::Renaming { draft, .. } => {
                *draft = text.into();
                Ok(())
            }
            _ => Err(invalid("edit a name", self)),
        }
    }

    /// Records upload progress. Progress never moves backwards.
    pub fn report_progress(&mut self, fraction: f64) -> AppResult<()> {
        match self {
            Self::UploadingFile { progress } => {
                *progress = progress.max(fraction.clamp(0.0, 1.0));
                Ok(())
            }
            _ => Err(invalid("report upload progress", self)),
        }
    }

    /// Submits the new-folder dialog, returning the draft and closing it.
    pub fn submit_folder(&mut self) -> AppResult<String> {
        match std::mem::take(self) {
            Self::CreatingFolder { draft } => Ok(draft),
            other => {
                let err = invalid("submit a folder", &other);
                *self = other;
                Err(err)
            }
        }
    }

    /// Ends an in-place rename.
    ///
    /// Returns the target and the trimmed draft, or `None` when the draft
    /// is blank, which cancels the rename.
    pub fn commit_rename(&mut self) -> AppResult<Option<(ItemRef, String)>> {
        match std::mem::take(self) {
            Self::Renaming { target, draft } => {
                let name = draft.trim();
                Ok((!name.is_empty()).then(|| (target, name.to_string())))
            }
            other => {
                let err = invalid("commit a rename", &other);
                *self = other;
                Err(err)
            }
        }
    }

    /// Confirms the open delete, returning what to delete.
    pub fn confirm_delete(&mut self) -> AppResult<ItemRef> {
        match self {
            Self::ConfirmingDelete {
                target,
                in_flight,
                error,
                ..
            } if !*in_flight => {
                *in_flight = true;
                *error = None;
                Ok(*target)
            }
            _ => Err(invalid("confirm a delete", self)),
        }
    }

    /// Records a failed delete. The dialog stays open with the error.
    pub fn delete_failed(&mut self, message: impl Into<String>) -> AppResult<()> {
        match self {
            Self::ConfirmingDelete {
                in_flight, error, ..
            } if *in_flight => {
                *in_flight = false;
                *error = Some(message.into());
                Ok(())
            }
            _ => Err(invalid("record a delete failure", self)),
        }
    }

    /// Marks the running upload or delete as finished.
    pub fn complete(&mut self) -> AppResult<()> {
        match self {
            Self::UploadingFile { .. }
            | Self::ConfirmingDelete {
                in_flight: true, ..
            } => {
                *self = Self::Idle;
                Ok(())
            }
            _ => Err(invalid("complete", self)),
        }
    }

    /// Closes whatever is open. A delete that is running cannot be dismissed.
    pub fn dismiss(&mut self) -> AppResult<()> {
        if let Self::ConfirmingDelete {
            in_flight: true, ..
        } = self
        {
            return Err(invalid("dismiss", self));
        }
        *self = Self::Idle;
        Ok(())
    }

    fn require_idle(&self, action: &str) -> AppResult<()> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(invalid(action, self))
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CreatingFolder { .. } => "creating a folder",
            Self::UploadingFile { .. } => "uploading",
            Self::ConfirmingDelete { in_flight: true, .. } => "deleting",
            Self::ConfirmingDelete { .. } => "confirming a delete",
            Self::Renaming { .. } => "renaming",
        }
    }
}

fn invalid(action: &str, state: &DashboardState) -> AppError {
    AppError::validation(format!("Cannot {action} while {}", state.label()))
}
