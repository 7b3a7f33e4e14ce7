//! Connection note composition.
//!
//! The composer never fails: any generator error, or a reply that is empty
//! after cleanup, falls back to a template built from local data only.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::traits::generator::{GenerationRequest, TextGenerator};
use crate::types::candidate::first_name;

/// Hard limit the destination UI imposes on notes.
pub const MAX_NOTE_CHARS: usize = 300;

/// Length the prompt asks for, leaving headroom under the hard limit.
pub const TARGET_NOTE_CHARS: usize = 250;

pub const DEFAULT_MAX_TOKENS: u32 = 150;

pub const SYSTEM_PROMPT: &str = "You are a professional networking assistant.";

const GREETING_PLACEHOLDER: &str = "[First Name]";

pub fn build_prompt(name: &str, company: &str, affiliation: &str) -> String {
    format!(
        "Write a short, professional, and friendly LinkedIn connection request note \
         (MAX {TARGET_NOTE_CHARS} characters) to {name}, who works at {company}. \
         The sender is an alumnus/student from {affiliation}. \
         The purpose is to request a brief virtual coffee chat to learn about their career path. \
         Write in the first person. Start with 'Hi {GREETING_PLACEHOLDER},'"
    )
}

/// Clean a generated reply: trim, fold line breaks into spaces, resolve the
/// greeting placeholder, enforce the length limit. `None` if nothing is left.
pub fn polish(raw: &str, name: &str) -> Option<String> {
    let flattened = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let resolved = flattened.replace(GREETING_PLACEHOLDER, greeting_name(name));
    let note = truncate_chars(&resolved, MAX_NOTE_CHARS);
    let note = note.trim_end();

    (!note.is_empty()).then(|| note.to_string())
}

/// Deterministic note used whenever generation fails.
pub fn fallback_message(name: &str, company: &str, affiliation: &str) -> String {
    let note = format!(
        "Hi {}, I'm reaching out as a fellow {} alumnus/student and admire your work at {}. \
         Would you be open to a quick virtual coffee chat?",
        greeting_name(name),
        affiliation,
        company
    );
    truncate_chars(&note, MAX_NOTE_CHARS)
}

fn greeting_name(name: &str) -> &str {
    match first_name(name) {
        "" => "there",
        first => first,
    }
}

/// Truncate on character boundaries, never mid code point.
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub struct MessageComposer {
    generator: Arc<dyn TextGenerator>,
    max_tokens: u32,
}

impl MessageComposer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// A non-empty note of at most [`MAX_NOTE_CHARS`] characters.
    pub async fn compose(&self, name: &str, company: &str, affiliation: &str) -> String {
        debug!(name, generator = self.generator.name(), "Generating note");

        let request = GenerationRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(name, company, affiliation),
            max_tokens: self.max_tokens,
        };

        let generated = self
            .generator
            .generate(&request)
            .await
            .and_then(|raw| polish(&raw, name).ok_or(GenerationError::Empty));

        match generated {
            Ok(note) => note,
            Err(e) => {
                warn!(
                    name,
                    generator = self.generator.name(),
                    error = %e,
                    "Note generation failed, using fallback message"
                );
                fallback_message(name, company, affiliation)
            }
        }
    }
}
