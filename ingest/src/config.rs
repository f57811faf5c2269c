//! Pipeline configuration.

use std::path::PathBuf;

/// Configuration for a `Pipeline` run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Max concurrent convert/process/chunk workers for a light batch (`page_count < heavy_page_threshold`).
    pub batch_limit_light: usize,
    /// Max concurrent convert/process/chunk workers for a heavy batch.
    pub batch_limit_heavy: usize,
    /// Page count at or above which a document is classified heavy.
    pub heavy_page_threshold: u32,
    /// Token budget per chunk.
    pub max_tokens: usize,
    /// Overlap gate for `TokenSplitter` (used only as a boolean; see `TokenSplitter`).
    pub overlap: usize,
    /// Minimum `fuzzy_partial_ratio` score for an outline title to match a header's text.
    pub fuzzy_threshold: f32,
    /// Root directory for checksum/converter/text/table/chunk sidecars.
    pub cache_root: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_limit_light: 4,
            batch_limit_heavy: 2,
            heavy_page_threshold: 500,
            max_tokens: 512,
            overlap: 50,
            fuzzy_threshold: 80.0,
            cache_root: PathBuf::from("./.docingest-cache"),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder seeded with default values.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

/// Fluent builder for [`PipelineConfig`].
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Creates a new builder seeded with [`PipelineConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Sets the light-batch worker limit.
    #[must_use]
    pub const fn batch_limit_light(mut self, limit: usize) -> Self {
        self.config.batch_limit_light = limit;
        self
    }

    /// Sets the heavy-batch worker limit.
    #[must_use]
    pub const fn batch_limit_heavy(mut self, limit: usize) -> Self {
        self.config.batch_limit_heavy = limit;
        self
    }

    /// Sets the page-count threshold for the heavy class.
    #[must_use]
    pub const fn heavy_page_threshold(mut self, threshold: u32) -> Self {
        self.config.heavy_page_threshold = threshold;
        self
    }

    /// Sets the per-chunk token budget.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Sets the `TokenSplitter` overlap gate.
    #[must_use]
    pub const fn overlap(mut self, overlap: usize) -> Self {
        self.config.overlap = overlap;
        self
    }

    /// Sets the fuzzy-match threshold used by `HeaderResolver`.
    #[must_use]
    pub const fn fuzzy_threshold(mut self, threshold: f32) -> Self {
        self.config.fuzzy_threshold = threshold;
        self
    }

    /// Sets the cache root directory.
    #[must_use]
    pub fn cache_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cache_root = path.into();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = PipelineConfig::default();
        assert_eq!(config.batch_limit_light, 4);
        assert_eq!(config.batch_limit_heavy, 2);
        assert_eq!(config.heavy_page_threshold, 500);
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.overlap, 50);
        assert!((config.fuzzy_threshold - 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = PipelineConfig::builder()
            .batch_limit_light(8)
            .max_tokens(1024)
            .cache_root("/tmp/cache")
            .build();

        assert_eq!(config.batch_limit_light, 8);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.cache_root, PathBuf::from("/tmp/cache"));
    }
}
