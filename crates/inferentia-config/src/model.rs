//! Typed configuration model for the inference engine.

use serde::{Deserialize, Serialize};

/// Full configuration for one knowledge base instance.
///
/// Every field has an environment-variable override (see [`crate::load`]) so
/// the defaults below only matter when nothing else is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Bound on the queue used by the concurrency harness's `multiplex` —
    /// how many proofs may sit unread before a producer blocks.
    #[serde(default = "default_multiplex_buffer_size")]
    pub multiplex_buffer_size: usize,

    /// How many levels of an expression's children the abstruse index keys
    /// recursively before degrading to a wildcard.
    #[serde(default = "default_index_key_depth")]
    pub index_key_depth: usize,

    /// Directory under which a persistent storage backend keeps its files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Reserved for a future relaxed unification mode; the unifier always
    /// performs the occurs check regardless of this flag today.
    #[serde(default = "default_strict_occurs_check")]
    pub strict_occurs_check: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            multiplex_buffer_size: default_multiplex_buffer_size(),
            index_key_depth: default_index_key_depth(),
            data_dir: default_data_dir(),
            strict_occurs_check: default_strict_occurs_check(),
        }
    }
}

fn default_multiplex_buffer_size() -> usize {
    1
}

fn default_index_key_depth() -> usize {
    2
}

fn default_strict_occurs_check() -> bool {
    true
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|d| d.join("inferentia").to_string_lossy().into_owned())
        .unwrap_or_else(|| "inferentia-data".to_string())
}
