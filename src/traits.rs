//! Seams to external collaborators.
//!
//! The planning core never talks to a model provider directly. Apps plug in
//! an [`AiBridge`] (the HTTP one in [`crate::bridge`], or a test double).

use crate::error::BridgeError;

/// A natural-language model service, possibly augmented with map tools.
///
/// Implementations are treated as untrusted: whatever text comes back is
/// validated before it influences a route.
pub trait AiBridge: Send + Sync {
    /// Sends one prompt with a system instruction and returns the final text.
    fn query(&self, prompt: &str, system_instruction: &str) -> Result<String, BridgeError>;
}

impl<T: AiBridge + ?Sized> AiBridge for std::sync::Arc<T> {
    fn query(&self, prompt: &str, system_instruction: &str) -> Result<String, BridgeError> {
        (**self).query(prompt, system_instruction)
    }
}

impl<T: AiBridge + ?Sized> AiBridge for &T {
    fn query(&self, prompt: &str, system_instruction: &str) -> Result<String, BridgeError> {
        (**self).query(prompt, system_instruction)
    }
}
