#![allow(dead_code)]

use std::collections::BTreeMap;

use branchdrive::config::{BatchConfig, BatchSection, RawBatchFile};

/// Builder for `BatchConfig` to simplify test setup.
pub struct BatchConfigBuilder {
    raw: RawBatchFile,
}

impl BatchConfigBuilder {
    pub fn new(template: &str) -> Self {
        Self {
            raw: RawBatchFile {
                batch: BatchSection {
                    targets: Vec::new(),
                    start: 1,
                    end: 1,
                    template: template.to_string(),
                    invocation_timeout_secs: None,
                },
                params: BTreeMap::new(),
            },
        }
    }

    pub fn target(mut self, path: &str) -> Self {
        self.raw.batch.targets.push(path.to_string());
        self
    }

    pub fn range(mut self, start: i64, end: i64) -> Self {
        self.raw.batch.start = start;
        self.raw.batch.end = end;
        self
    }

    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.raw.params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn invocation_timeout_secs(mut self, secs: u64) -> Self {
        self.raw.batch.invocation_timeout_secs = Some(secs);
        self
    }

    /// The raw, unvalidated shape, for tests exercising validation itself.
    pub fn build_raw(self) -> RawBatchFile {
        self.raw
    }

    pub fn build(self) -> BatchConfig {
        BatchConfig::try_from(self.raw).expect("Failed to build valid config from builder")
    }
}
