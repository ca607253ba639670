//! Dialog state shared by the screens: success toast, error box, field editor
//! and yes/no confirmation. Pure state; the clock is passed in.

use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};

use crate::config::DEFAULT_SUCCESS_MODAL_MS;
use crate::models::FieldValue;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageModal {
    pub visible: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditKind {
    #[default]
    Basic,
    Skill,
}

const NUMERIC_BASIC_FIELDS: &[&str] = &[
    "jerseyNumber",
    "position",
    "age",
    "height",
    "weightPounds",
    "overallRating",
];

const BOOL_BASIC_FIELDS: &[&str] = &["isImpactPlayer"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditModal {
    pub visible: bool,
    pub field: String,
    pub current_value: String,
    pub kind: EditKind,
    pub input: String,
}

impl EditModal {
    pub fn wants_numeric_input(&self) -> bool {
        self.kind == EditKind::Skill || NUMERIC_BASIC_FIELDS.contains(&self.field.as_str())
    }

    /// Interprets the input buffer for the field being edited.
    pub fn parse_input(&self) -> Result<FieldValue> {
        let raw = self.input.trim();
        if self.wants_numeric_input() {
            return raw
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| anyhow!("Please enter a valid number"));
        }
        if BOOL_BASIC_FIELDS.contains(&self.field.as_str()) {
            return FieldValue::from(raw)
                .as_bool()
                .map(FieldValue::Bool)
                .ok_or_else(|| anyhow!("Please enter true or false"));
        }
        Ok(FieldValue::Text(self.input.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmModal<A> {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub danger: bool,
    pub action: A,
}

impl<A> ConfirmModal<A> {
    pub fn new(title: impl Into<String>, message: impl Into<String>, action: A) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_label: "Confirm".to_string(),
            cancel_label: "Cancel".to_string(),
            danger: false,
            action,
        }
    }

    pub fn labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_label = confirm.into();
        self.cancel_label = cancel.into();
        self
    }

    pub fn danger(mut self) -> Self {
        self.danger = true;
        self
    }
}

/// All dialogs for one screen. `A` is whatever the confirmation dialog should
/// run when accepted.
#[derive(Debug, Clone)]
pub struct Modals<A> {
    pub success: MessageModal,
    pub error: MessageModal,
    pub edit: EditModal,
    pub confirm: Option<ConfirmModal<A>>,
    success_duration: Duration,
    success_since: Option<Instant>,
}

impl<A> Default for Modals<A> {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SUCCESS_MODAL_MS))
    }
}

impl<A> Modals<A> {
    pub fn new(success_duration: Duration) -> Self {
        Self {
            success: MessageModal::default(),
            error: MessageModal::default(),
            edit: EditModal::default(),
            confirm: None,
            success_duration,
            success_since: None,
        }
    }

    pub fn show_success(&mut self, message: impl Into<String>, now: Instant) {
        self.success = MessageModal {
            visible: true,
            message: message.into(),
        };
        self.success_since = Some(now);
    }

    pub fn hide_success(&mut self) {
        self.success = MessageModal::default();
        self.success_since = None;
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error = MessageModal {
            visible: true,
            message: message.into(),
        };
    }

    pub fn hide_error(&mut self) {
        self.error = MessageModal::default();
    }

    pub fn show_edit(&mut self, field: &str, current_value: &FieldValue, kind: EditKind) {
        let current = current_value.to_string();
        self.edit = EditModal {
            visible: true,
            field: field.to_string(),
            current_value: current.clone(),
            kind,
            input: current,
        };
    }

    pub fn hide_edit(&mut self) {
        self.edit = EditModal::default();
    }

    pub fn show_confirm(&mut self, confirm: ConfirmModal<A>) {
        self.confirm = Some(confirm);
    }

    /// Closes the confirmation and hands back its action if it was accepted.
    pub fn resolve_confirm(&mut self, accepted: bool) -> Option<A> {
        let confirm = self.confirm.take()?;
        accepted.then_some(confirm.action)
    }

    /// Auto-dismisses the success dialog once its duration has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(since) = self.success_since
            && now.saturating_duration_since(since) >= self.success_duration
        {
            self.hide_success();
        }
    }

    pub fn any_visible(&self) -> bool {
        self.success.visible || self.error.visible || self.edit.visible || self.confirm.is_some()
    }
}
