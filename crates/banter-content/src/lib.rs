//! Content pipeline for chat messages.
//!
//! Untrusted text goes through the allow-list sanitizer first and the
//! auto-linker second. The order matters: the sanitizer would strip the
//! anchors the linker adds.

pub mod autolink;
pub mod sanitize;
pub mod tokenizer;

pub use autolink::autolink;
pub use sanitize::{AllowList, Sanitizer, sanitize};

#[derive(Debug, Clone, Default)]
pub struct ContentPipeline {
    sanitizer: Sanitizer,
}

impl ContentPipeline {
    pub fn new(sanitizer: Sanitizer) -> Self {
        Self { sanitizer }
    }

    pub fn clean(&self, raw: &str) -> String {
        autolink(&self.sanitizer.sanitize(raw))
    }
}

/// Sanitizes with the default allow list, then links bare addresses.
pub fn clean(raw: &str) -> String {
    autolink(&sanitize(raw))
}
