//! Prompt construction for slide explanations.
//!
//! Builds the user message sent to the language model for one slide:
//!
//! ```text
//! Slide 3:
//! Ownership and borrowing in Rust
//!
//! Please explain the content of this slide.
//! ```

/// Instruction appended after the slide text unless overridden.
pub const DEFAULT_INSTRUCTION: &str = "Please explain the content of this slide.";

/// System message for chat-style completion APIs.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a patient teacher. \
You receive the text of a single presentation slide and explain it clearly \
and concisely to a student who is studying the deck on their own.";

/// Builder for slide prompts.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    /// Text appended after the slide content.
    instruction: String,
    /// System message for chat-style APIs.
    system_message: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            instruction: DEFAULT_INSTRUCTION.to_string(),
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
        }
    }
}

impl PromptBuilder {
    /// Create a prompt builder with the default instruction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom instruction. Blank instructions are ignored.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        let instruction = instruction.into();
        if !instruction.trim().is_empty() {
            self.instruction = instruction.trim().to_string();
        }
        self
    }

    /// Use a custom system message. Blank messages are ignored.
    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.trim().is_empty() {
            self.system_message = message.trim().to_string();
        }
        self
    }

    /// The system message for chat-style APIs.
    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    /// Build the prompt for one slide.
    pub fn build(&self, slide_number: usize, text: &str) -> String {
        format!("Slide {}:\n{}\n\n{}", slide_number, text, self.instruction)
    }
}
