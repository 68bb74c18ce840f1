//! LLM query synthesis.
//!
//! Builds a grounded prompt and performs exactly one generation call. Retry
//! and fallback decisions belong to the caller.

pub mod prompt;

use crate::llm::{GenerationOptions, LlmError, TextGenerator};
use crate::ontology::OntologySchema;

/// Untrusted model output, before sanitizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelOutput(pub String);

impl RawModelOutput {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Ask the generator for a SPARQL query answering `question`.
pub fn synthesize(
    generator: &dyn TextGenerator,
    question: &str,
    schema: &OntologySchema,
) -> Result<RawModelOutput, LlmError> {
    let prompt = prompt::build_prompt(question, schema);
    tracing::debug!(model = generator.model(), prompt_len = prompt.len(), "requesting SPARQL from model");
    let text = generator.generate(&prompt, &GenerationOptions::default())?;
    tracing::debug!(raw = %text, "model output");
    Ok(RawModelOutput(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        prompts: Mutex<Vec<String>>,
        reply: String,
    }

    impl TextGenerator for Recording {
        fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
            assert_eq!(*options, GenerationOptions::default());
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }

        fn model(&self) -> &str {
            "recording"
        }
    }

    struct Down;

    impl TextGenerator for Down {
        fn generate(&self, _: &str, _: &GenerationOptions) -> Result<String, LlmError> {
            Err(LlmError::Timeout { timeout_secs: 90 })
        }

        fn model(&self) -> &str {
            "down"
        }
    }

    #[test]
    fn single_call_with_question_in_prompt() {
        let generator = Recording {
            prompts: Mutex::new(Vec::new()),
            reply: "SELECT ?x WHERE { ?x a mobilite:Bus }".into(),
        };
        let out = synthesize(&generator, "Liste les bus", &OntologySchema::curated()).unwrap();
        assert_eq!(out.as_str(), "SELECT ?x WHERE { ?x a mobilite:Bus }");
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Liste les bus"));
    }

    #[test]
    fn errors_propagate_unchanged() {
        let err = synthesize(&Down, "x", &OntologySchema::curated()).unwrap_err();
        assert!(matches!(err, LlmError::Timeout { timeout_secs: 90 }));
    }
}
