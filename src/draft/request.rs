//! Request and response types for drafting.
//!
//! [`DraftRequest`] is the wire shape accepted by `POST /draft` and
//! `POST /draft_form`.  It is validated once into a [`DraftJob`], whose
//! [`DraftMode`] carries the edit-only fields, so nothing downstream has to
//! re-check them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Style enums
// ---------------------------------------------------------------------------

/// Which drafting strategy the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// Compose a fresh reply.
    #[default]
    Draft,
    /// Regenerate the whole reply from scratch.
    Rewrite,
    /// Change only a selected span of an existing draft.
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Friendly,
    #[default]
    Professional,
    Firm,
    Warm,
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Shorter,
    #[default]
    Same,
    Longer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Detail {
    Less,
    #[default]
    Same,
    More,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Friendly => "friendly",
            Tone::Professional => "professional",
            Tone::Firm => "firm",
            Tone::Warm => "warm",
            Tone::Direct => "direct",
        }
    }
}

impl Length {
    pub fn as_str(self) -> &'static str {
        match self {
            Length::Shorter => "shorter",
            Length::Same => "same",
            Length::Longer => "longer",
        }
    }
}

impl Detail {
    pub fn as_str(self) -> &'static str {
        match self {
            Detail::Less => "less",
            Detail::Same => "same",
            Detail::More => "more",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DraftRequest (wire)
// ---------------------------------------------------------------------------

/// Inbound drafting request, as sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRequest {
    /// The inbound email or thread being replied to.
    pub email_context: String,
    /// What the user asked for (voice transcript or typed).
    pub instruction: String,
    #[serde(default)]
    pub mode: ModeKind,
    /// Exact substring of `current_draft` to change (edit mode).
    #[serde(default)]
    pub selected_text: Option<String>,
    /// The existing draft body (edit mode).
    #[serde(default)]
    pub current_draft: Option<String>,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub length: Length,
    #[serde(default)]
    pub detail: Detail,
    /// Falls back to the configured company name when absent or blank.
    #[serde(default)]
    pub company_name: Option<String>,
}

impl DraftRequest {
    /// A `draft`-mode request with default style controls.
    pub fn new(email_context: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            email_context: email_context.into(),
            instruction: instruction.into(),
            mode: ModeKind::Draft,
            selected_text: None,
            current_draft: None,
            tone: Tone::default(),
            length: Length::default(),
            detail: Detail::default(),
            company_name: None,
        }
    }

    /// Validate mode-specific fields and produce a [`DraftJob`].
    ///
    /// Edit mode needs both a non-empty `selected_text` and a non-empty
    /// `current_draft`; any other mode ignores them.
    pub fn into_job(self, default_company: &str) -> Result<DraftJob, ValidationError> {
        let mode = match self.mode {
            ModeKind::Draft => DraftMode::Draft,
            ModeKind::Rewrite => DraftMode::Rewrite,
            ModeKind::Edit => {
                let selected_text = non_empty(self.selected_text)
                    .ok_or(ValidationError::MissingSelectedText)?;
                let current_draft = non_empty(self.current_draft)
                    .ok_or(ValidationError::MissingCurrentDraft)?;
                DraftMode::Edit(EditTarget {
                    current_draft,
                    selected_text,
                })
            }
        };

        let company_name = self
            .company_name
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| default_company.to_string());

        Ok(DraftJob {
            email_context: self.email_context,
            instruction: self.instruction,
            mode,
            style: StyleControls {
                tone: self.tone,
                length: self.length,
                detail: self.detail,
                company_name,
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A request that is well-formed but cannot be drafted as asked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("mode='edit' requires selected_text")]
    MissingSelectedText,

    #[error("mode='edit' requires current_draft (the existing email body)")]
    MissingCurrentDraft,
}

// ---------------------------------------------------------------------------
// DraftJob (validated)
// ---------------------------------------------------------------------------

/// Drafting strategy together with the fields that strategy needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftMode {
    Draft,
    Rewrite,
    Edit(EditTarget),
}

/// The body being edited and the passage to change.  Both are non-empty;
/// only [`DraftRequest::into_job`] builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    current_draft: String,
    selected_text: String,
}

impl EditTarget {
    pub fn current_draft(&self) -> &str {
        &self.current_draft
    }

    pub fn selected_text(&self) -> &str {
        &self.selected_text
    }
}

impl DraftMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            DraftMode::Draft => ModeKind::Draft,
            DraftMode::Rewrite => ModeKind::Rewrite,
            DraftMode::Edit(_) => ModeKind::Edit,
        }
    }
}

/// Tone/length/detail/company directives rendered into the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleControls {
    pub tone: Tone,
    pub length: Length,
    pub detail: Detail,
    pub company_name: String,
}

/// A validated request, ready for prompt assembly.  Obtained only from
/// [`DraftRequest::into_job`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftJob {
    email_context: String,
    instruction: String,
    mode: DraftMode,
    style: StyleControls,
}

impl DraftJob {
    pub fn email_context(&self) -> &str {
        &self.email_context
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn mode(&self) -> &DraftMode {
        &self.mode
    }

    pub fn style(&self) -> &StyleControls {
        &self.style
    }
}

// ---------------------------------------------------------------------------
// DraftResponse
// ---------------------------------------------------------------------------

/// The reply returned to the client.  Every field is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftResponse {
    pub subject_suggestion: String,
    pub reply_draft: String,
    pub assumptions: Vec<String>,
    pub questions_to_confirm: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
