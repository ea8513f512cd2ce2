// Reasoning prompt fragments. The system prompt itself is not here: it is
// loaded from the reasoning prompt file for every run.

/// Sampling settings for reasoning annotations. Short, mildly creative output.
pub const REASONING_MAX_TOKENS: u32 = 150;
pub const REASONING_TEMPERATURE: f32 = 0.5;

/// Prefix placed on the reasoning field when an annotation call fails.
pub const REASONING_ERROR_PREFIX: &str = "Error generating reasoning";

/// User message for a single (requirement, experience) pair.
pub fn build_reasoning_prompt(requirement: &str, experience_text: &str) -> String {
    format!("Job Requirement: \"{requirement}\"\nCandidate Experience: \"{experience_text}\"")
}
