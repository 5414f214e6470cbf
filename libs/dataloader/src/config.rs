//! Loader configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Batch window settings for a [`BatchLoader`](crate::BatchLoader).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// How long the first key of a window waits for siblings before dispatch.
    /// `0` dispatches after a single scheduler yield.
    pub batch_delay_ms: u64,

    /// Upper bound on keys handed to one fetch call. Larger windows are split.
    pub max_batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_delay_ms: 0,
            max_batch_size: 100,
        }
    }
}

impl LoaderConfig {
    #[must_use]
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Chunk size used when splitting a window; never zero.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.max_batch_size.max(1)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let cfg: LoaderConfig = serde_json::from_str(r#"{"max_batch_size": 5}"#).unwrap();

        assert_eq!(cfg.batch_delay_ms, 0);
        assert_eq!(cfg.max_batch_size, 5);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_str::<LoaderConfig>(r#"{"batch_size": 5}"#);

        assert!(result.is_err());
    }

    #[test]
    fn zero_batch_size_still_chunks() {
        let cfg = LoaderConfig {
            max_batch_size: 0,
            ..LoaderConfig::default()
        };

        assert_eq!(cfg.chunk_size(), 1);
    }
}
