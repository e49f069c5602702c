//! Edit-in-place state machine
//!
//! ```text
//! Viewing --start_edit--> Editing --handle_save--> Saving --ok--> Viewing
//!    ^                      |  ^                      |
//!    +------cancel_edit-----+  +--------error---------+
//! ```
//!
//! The committed value (`view`) only changes when the server confirms a
//! save. The draft (`form`) survives every failure and is discarded only
//! by cancel or success.

use std::collections::BTreeMap;
use std::future::Future;

use tracing::debug;

use patrimoni_common::models::{Editable, PendingImage};
use patrimoni_common::validation::{Validate, ValidationResult, ValidationRules};

use crate::api::ApiError;

/// Draft validator: `(form, pending_image) -> Ok | first error`
pub type Validator<T> = Box<dyn Fn(&T, Option<&PendingImage>) -> ValidationResult + Send + Sync>;

/// Called with the new committed value after each successful save
pub type SavedHook<T> = Box<dyn FnMut(&T) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Viewing,
    Editing,
    Saving,
}

/// What a call to [`EditInPlace::handle_save`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Not in the editing state; nothing happened
    NotEditing,
    /// The validator rejected the draft; still editing
    Invalid,
    /// No difference from the committed value; back to viewing, no request
    Unchanged,
    /// Server confirmed; back to viewing
    Saved,
    /// Server or network failure; still editing with the draft intact
    Failed,
}

pub struct EditInPlace<T: Editable> {
    view: T,
    form: T,
    state: EditState,
    error: Option<String>,
    field_errors: BTreeMap<String, String>,
    pending_image: Option<PendingImage>,
    image_rev: u64,
    validator: Option<Validator<T>>,
    on_saved: Option<SavedHook<T>>,
}

impl<T: Editable> EditInPlace<T> {
    pub fn new(initial: T) -> Self {
        Self {
            form: initial.clone(),
            view: initial,
            state: EditState::Viewing,
            error: None,
            field_errors: BTreeMap::new(),
            pending_image: None,
            image_rev: 0,
            validator: None,
            on_saved: None,
        }
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T, Option<&PendingImage>) -> ValidationResult + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Validate drafts with the entity's declarative validator
    pub fn with_rules(self, rules: ValidationRules) -> Self
    where
        T: Validate,
    {
        self.with_validator(move |draft: &T, image| draft.validate(&rules, image))
    }

    pub fn on_saved<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.on_saved = Some(Box::new(hook));
        self
    }

    // ========================================
    // Accessors
    // ========================================

    /// Last committed value
    pub fn view(&self) -> &T {
        &self.view
    }

    /// Current draft; equal to `view` outside editing
    pub fn form(&self) -> &T {
        &self.form
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing | EditState::Saving)
    }

    pub fn is_saving(&self) -> bool {
        self.state == EditState::Saving
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Errors attached to a specific canonical field
    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    pub fn pending_image(&self) -> Option<&PendingImage> {
        self.pending_image.as_ref()
    }

    /// Cache-busting revision for the entity's image URL
    pub fn image_rev(&self) -> u64 {
        self.image_rev
    }

    /// True if the draft differs from `view` or an image is waiting
    pub fn has_changes(&self) -> bool {
        self.form != self.view || self.pending_image.is_some()
    }

    // ========================================
    // Transitions
    // ========================================

    fn clear_errors(&mut self) {
        self.error = None;
        self.field_errors.clear();
    }

    fn record_error(&mut self, message: String, field: Option<&str>) {
        if let Some(field) = field {
            self.field_errors.insert(field.to_string(), message.clone());
        }
        self.error = Some(message);
    }

    /// Viewing -> Editing, with a fresh draft
    pub fn start_edit(&mut self) -> bool {
        if self.state != EditState::Viewing {
            return false;
        }
        self.clear_errors();
        self.form = self.view.clone();
        self.pending_image = None;
        self.state = EditState::Editing;
        true
    }

    /// Editing -> Viewing, discarding the draft
    pub fn cancel_edit(&mut self) -> bool {
        if self.state != EditState::Editing {
            return false;
        }
        self.clear_errors();
        self.form = self.view.clone();
        self.pending_image = None;
        self.state = EditState::Viewing;
        true
    }

    /// Change one draft field; ignored outside editing
    pub fn handle_change(&mut self, change: T::Change) {
        if self.state == EditState::Editing {
            self.form.apply(change);
        }
    }

    /// Attach or detach an image for the next save
    pub fn set_pending_image(&mut self, image: Option<PendingImage>) {
        if self.state == EditState::Editing {
            self.pending_image = image;
        }
    }

    /// Validate, then persist the draft through `save`
    ///
    /// `save` receives the draft and any pending image and must resolve to
    /// the committed value as the server now holds it.
    pub async fn handle_save<F, Fut>(&mut self, save: F) -> SaveOutcome
    where
        F: FnOnce(T, Option<PendingImage>) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if self.state != EditState::Editing {
            return SaveOutcome::NotEditing;
        }
        self.clear_errors();

        if let Some(validator) = &self.validator {
            if let Err(err) = validator(&self.form, self.pending_image.as_ref()) {
                debug!(field = ?err.field, "Draft rejected by validator");
                self.record_error(err.message, err.field.as_deref());
                return SaveOutcome::Invalid;
            }
        }

        if !self.has_changes() {
            self.state = EditState::Viewing;
            return SaveOutcome::Unchanged;
        }

        self.state = EditState::Saving;
        let uploaded_image = self.pending_image.is_some();
        match save(self.form.clone(), self.pending_image.clone()).await {
            Ok(saved) => {
                self.view = saved;
                self.form = self.view.clone();
                self.pending_image = None;
                if uploaded_image {
                    self.image_rev += 1;
                }
                self.state = EditState::Viewing;
                if let Some(hook) = self.on_saved.as_mut() {
                    hook(&self.view);
                }
                SaveOutcome::Saved
            }
            Err(err) => {
                debug!(error = %err, "Save failed; keeping draft");
                self.record_error(err.user_message(), err.field());
                self.state = EditState::Editing;
                SaveOutcome::Failed
            }
        }
    }

    /// Adopt a value returned by a standalone image upload or delete
    ///
    /// Only call this with a server-confirmed value; it bumps the image
    /// revision. An open draft keeps its field edits.
    pub fn apply_image_change(&mut self, updated: T) {
        self.view = updated;
        if !self.is_editing() {
            self.form = self.view.clone();
        }
        self.image_rev += 1;
    }

    /// Replace the committed value from outside (e.g. a refetch)
    ///
    /// Ignored while a draft is open.
    pub fn replace_view(&mut self, value: T) -> bool {
        if self.state != EditState::Viewing {
            return false;
        }
        self.form = value.clone();
        self.view = value;
        true
    }
}
