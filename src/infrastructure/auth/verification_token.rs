//! Verification token generator

use rand::RngCore;

/// Generator for single-use email-verification tokens.
///
/// Tokens are random bytes, hex-encoded; they are stored verbatim on the
/// account and cleared on consumption.
#[derive(Clone)]
pub struct VerificationTokenGenerator {
    /// Length of the token in random bytes (hex-encoded to twice this)
    token_length: usize,
}

impl VerificationTokenGenerator {
    /// Create a generator with the default token length
    pub fn new() -> Self {
        Self { token_length: 32 }
    }

    /// Create a generator with a custom token length
    pub fn with_length(token_length: usize) -> Self {
        Self { token_length }
    }

    /// Generate a new verification token
    pub fn generate(&self) -> String {
        let mut random_bytes = vec![0u8; self.token_length];
        rand::rng().fill_bytes(&mut random_bytes);
        hex::encode(random_bytes)
    }
}

impl Default for VerificationTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}
