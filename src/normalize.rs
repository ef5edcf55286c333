//! Deterministic transcript normalisation.
//!
//! Speech-to-text reliably mangles a handful of proper nouns (the product
//! name, the company name).  [`Normalizer`] fixes them with literal
//! substring replacement and reports every rule that fired so the UI can
//! show the user what was changed.
//!
//! Rules run once each, in table order, against the text produced by the
//! rules before them.  A rule never sees its own output.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Built-in rule table
// ---------------------------------------------------------------------------

/// Known mis-transcriptions, in application order.
static BUILTIN_RULES: &[(&str, &str)] = &[
    ("Robotoq", "Robotalk"),
    ("RoboTalk", "Robotalk"),
    ("Radburry", "Radbury"),
    ("Radberry", "Radbury"),
];

// ---------------------------------------------------------------------------
// Rule / Change
// ---------------------------------------------------------------------------

/// A single literal replacement rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// The mis-transcribed form.
    pub from: String,
    /// The corrected form.
    pub to: String,
}

impl Rule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Record of a rule that matched at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub from: String,
    pub to: String,
}

/// Output of [`Normalizer::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NormalizationResult {
    /// Fully substituted text.
    pub clean_text: String,
    /// Rules that fired, in rule-table order.
    pub changes: Vec<Change>,
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Ordered table of literal substitutions.
///
/// # Example
/// ```rust
/// use robotalk::normalize::Normalizer;
///
/// let result = Normalizer::new().normalize("Robotoq called about RoboTalk install");
/// assert_eq!(result.clean_text, "Robotalk called about Robotalk install");
/// assert_eq!(result.changes.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: Vec<Rule>,
}

impl Normalizer {
    /// Normaliser with only the built-in table.
    pub fn new() -> Self {
        Self::with_extra_rules(std::iter::empty())
    }

    /// Built-in table followed by `extra` in the given order.
    ///
    /// Rules with an empty `from` are skipped: an empty pattern matches
    /// everywhere and would splice `to` between every character.
    pub fn with_extra_rules(extra: impl IntoIterator<Item = Rule>) -> Self {
        let mut rules: Vec<Rule> = BUILTIN_RULES
            .iter()
            .map(|(from, to)| Rule::new(*from, *to))
            .collect();

        for rule in extra {
            if rule.from.is_empty() {
                log::warn!("Ignoring normalisation rule with empty source (to={:?})", rule.to);
                continue;
            }
            rules.push(rule);
        }

        Self { rules }
    }

    /// The active rules, in application order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Apply every rule once, in order.  Never fails; empty input yields an
    /// empty result with no changes.
    pub fn normalize(&self, text: &str) -> NormalizationResult {
        let mut clean = text.to_string();
        let mut changes = Vec::new();

        for rule in &self.rules {
            if clean.contains(rule.from.as_str()) {
                clean = clean.replace(rule.from.as_str(), &rule.to);
                changes.push(Change {
                    from: rule.from.clone(),
                    to: rule.to.clone(),
                });
            }
        }

        NormalizationResult {
            clean_text: clean,
            changes,
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalise with the built-in table only.
pub fn normalize(text: &str) -> NormalizationResult {
    Normalizer::new().normalize(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
