//! Prompt builder for email drafting.
//!
//! [`PromptBuilder`] turns a validated [`DraftJob`] into a
//! `(system_msg, user_msg)` pair for an OpenAI-compatible chat endpoint.
//!
//! The user message is assembled from fixed blocks, in order:
//! 1. Mode preamble (draft / rewrite / edit rules)
//! 2. Style controls
//! 3. Delimited input blocks (context, current draft, selection, instruction)
//! 4. Output schema

use crate::config::DraftingConfig;
use crate::draft::request::{DraftJob, DraftMode, StyleControls};

// ---------------------------------------------------------------------------
// Mode preambles
// ---------------------------------------------------------------------------

const DRAFT_PREAMBLE: &str = "Draft a reply from scratch using the context and instruction.";

const REWRITE_PREAMBLE: &str = "Rewrite the reply from scratch using the context and instruction.";

const EDIT_PREAMBLE: &str = "\
You are editing an existing email draft.
CRITICAL RULES:
1) You MUST keep the email identical EXCEPT for the selected text.
2) Do NOT rephrase or change anything outside the selected text.
3) If the instruction implies removing something, remove ONLY within the selected text.
4) Return the FULL updated email body.
";

// ---------------------------------------------------------------------------
// Output schema
// ---------------------------------------------------------------------------

const OUTPUT_SCHEMA: &str = "\
Return STRICT JSON with keys:
- subject_suggestion (string)
- reply_draft (string, email body only)
- assumptions (list of strings)
- questions_to_confirm (list of strings)
";

const EDIT_SCHEMA_NOTE: &str = "\
In edit mode, assumptions/questions should usually be empty unless the instruction introduces new unknowns.
";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds drafting prompts in chat-message format.
///
/// # Example
/// ```rust
/// use robotalk::config::DraftingConfig;
/// use robotalk::draft::{DraftRequest, PromptBuilder};
///
/// let builder = PromptBuilder::new(&DraftingConfig::default());
/// let job = DraftRequest::new("Window is stiff.", "Offer a visit.")
///     .into_job("Radbury Double Glazing")
///     .unwrap();
/// let (system, user) = builder.build_chat(&job);
/// assert!(system.contains("Return ONLY valid JSON"));
/// assert!(user.contains("Offer a visit."));
/// ```
pub struct PromptBuilder {
    business_domain: String,
    spelling: String,
}

impl PromptBuilder {
    pub fn new(config: &DraftingConfig) -> Self {
        Self {
            business_domain: config.business_domain.clone(),
            spelling: config.spelling.clone(),
        }
    }

    /// Build a **(system_msg, user_msg)** pair for `job`.
    pub fn build_chat(&self, job: &DraftJob) -> (String, String) {
        (self.system_instruction(), self.user_message(job))
    }

    /// The fixed framing sent as the system message.
    pub fn system_instruction(&self) -> String {
        format!(
            "You are an expert executive assistant for {domain}. \
             Draft clear, accurate, professional emails. Use {spelling} spelling. \
             Do NOT invent facts. If key info is missing, ask short questions at the end. \
             Avoid admitting liability. \
             Avoid promising refunds/replacements/compensation unless explicitly instructed. \
             Return ONLY valid JSON. No markdown. No extra commentary.",
            domain = self.business_domain,
            spelling = self.spelling,
        )
    }

    fn user_message(&self, job: &DraftJob) -> String {
        let mut msg = String::with_capacity(
            1024 + job.email_context().len() + job.instruction().len() * 2,
        );

        match job.mode() {
            mode @ (DraftMode::Draft | DraftMode::Rewrite) => {
                let preamble = if *mode == DraftMode::Rewrite {
                    REWRITE_PREAMBLE
                } else {
                    DRAFT_PREAMBLE
                };
                msg.push_str(preamble);
                msg.push('\n');
                msg.push_str(&style_block(job.style()));
                msg.push_str(&block("EMAIL CONTEXT (INBOUND THREAD)", job.email_context()));
                msg.push_str(&block("MD INSTRUCTION (VOICE/TEXT)", job.instruction()));
                msg.push_str(OUTPUT_SCHEMA);
            }
            DraftMode::Edit(target) => {
                msg.push_str(EDIT_PREAMBLE);
                msg.push_str(&style_block(job.style()));
                msg.push_str(&block("EMAIL CONTEXT (INBOUND THREAD)", job.email_context()));
                msg.push_str(&block("CURRENT DRAFT (EMAIL BODY)", target.current_draft()));
                msg.push_str(&block(
                    "SELECTED TEXT TO CHANGE (EXACT SUBSTRING FROM CURRENT DRAFT)",
                    target.selected_text(),
                ));
                msg.push_str(&block("EDIT INSTRUCTION", job.instruction()));
                msg.push_str(OUTPUT_SCHEMA);
                msg.push_str(EDIT_SCHEMA_NOTE);
            }
        }

        msg
    }
}

fn style_block(style: &StyleControls) -> String {
    format!(
        "\nSTYLE CONTROLS:\n- Tone: {}\n- Length: {}\n- Detail: {}\n- Company: {}\n",
        style.tone, style.length, style.detail, style.company_name
    )
}

/// A labelled block fenced with `---` lines.
fn block(label: &str, body: &str) -> String {
    format!("\n{label}:\n---\n{body}\n---\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::request::{DraftRequest, ModeKind, Tone};

    const COMPANY: &str = "Radbury Double Glazing";

    fn builder() -> PromptBuilder {
        PromptBuilder::new(&DraftingConfig::default())
    }

    fn job(mode: ModeKind) -> DraftJob {
        job_with_context(mode, "Customer complains window is stiff.")
    }

    fn job_with_context(mode: ModeKind, email_context: &str) -> DraftJob {
        DraftRequest {
            mode,
            tone: Tone::Friendly,
            selected_text: Some("We will call you next week.".into()),
            current_draft: Some("Dear Sam,\nWe will call you next week.\nRegards".into()),
            ..DraftRequest::new(email_context, "Apologise and offer a service visit.")
        }
        .into_job(COMPANY)
        .unwrap()
    }

    #[test]
    fn system_message_carries_fixed_framing() {
        let (system, _) = builder().build_chat(&job(ModeKind::Draft));

        assert!(system.contains("a UK double glazing company"));
        assert!(system.contains("Use UK spelling"));
        assert!(system.contains("Do NOT invent facts"));
        assert!(system.contains("ask short questions at the end"));
        assert!(system.contains("Avoid admitting liability"));
        assert!(system.contains("refunds/replacements/compensation"));
        assert!(system.contains("Return ONLY valid JSON. No markdown."));
    }

    #[test]
    fn system_message_follows_config() {
        let config = DraftingConfig {
            business_domain: "a US roofing contractor".into(),
            spelling: "US".into(),
            ..DraftingConfig::default()
        };
        let system = PromptBuilder::new(&config).system_instruction();

        assert!(system.contains("a US roofing contractor"));
        assert!(system.contains("Use US spelling"));
    }

    #[test]
    fn draft_prompt_contains_inputs_and_style() {
        let (_, user) = builder().build_chat(&job(ModeKind::Draft));

        assert!(user.starts_with(DRAFT_PREAMBLE));
        assert!(user.contains("Customer complains window is stiff."));
        assert!(user.contains("Apologise and offer a service visit."));
        assert!(user.contains("Tone: friendly"));
        assert!(user.contains("Length: same"));
        assert!(user.contains("Detail: same"));
        assert!(user.contains("Company: Radbury Double Glazing"));
        assert!(user.contains("- questions_to_confirm (list of strings)"));
    }

    #[test]
    fn draft_prompt_omits_edit_blocks() {
        let (_, user) = builder().build_chat(&job(ModeKind::Draft));

        assert!(!user.contains("CURRENT DRAFT"));
        assert!(!user.contains("SELECTED TEXT"));
        assert!(!user.contains("We will call you next week."));
        assert!(!user.contains("In edit mode"));
    }

    #[test]
    fn rewrite_prompt_uses_rewrite_preamble() {
        let (_, user) = builder().build_chat(&job(ModeKind::Rewrite));

        assert!(user.starts_with(REWRITE_PREAMBLE));
        assert!(!user.contains(DRAFT_PREAMBLE));
        assert!(user.contains("MD INSTRUCTION (VOICE/TEXT):\n---\nApologise and offer a service visit.\n---"));
    }

    #[test]
    fn edit_prompt_lists_rules_and_blocks_in_order() {
        let (_, user) = builder().build_chat(&job(ModeKind::Edit));

        assert!(user.starts_with("You are editing an existing email draft."));
        for rule in ["1) You MUST keep", "2) Do NOT rephrase", "3) If the instruction", "4) Return the FULL"] {
            assert!(user.contains(rule), "missing rule {rule:?}");
        }

        let context = user.find("EMAIL CONTEXT (INBOUND THREAD):").unwrap();
        let current = user.find("CURRENT DRAFT (EMAIL BODY):").unwrap();
        let selected = user.find("SELECTED TEXT TO CHANGE").unwrap();
        let instruction = user.find("EDIT INSTRUCTION:").unwrap();
        assert!(context < current && current < selected && selected < instruction);

        assert!(user.contains("---\nWe will call you next week.\n---"));
        assert!(user.contains("Dear Sam,\nWe will call you next week.\nRegards"));
        assert!(user.contains("assumptions/questions should usually be empty"));
    }

    #[test]
    fn inputs_are_embedded_verbatim() {
        let j = job_with_context(ModeKind::Draft, "Line one\n\n  {\"json\": true}  \nLine three");
        let (_, user) = builder().build_chat(&j);

        assert!(user.contains("Line one\n\n  {\"json\": true}  \nLine three"));
    }
}
