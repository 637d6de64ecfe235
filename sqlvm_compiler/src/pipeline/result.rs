use crate::lexical::LexicalMetrics;
use crate::preprocess::InstrumentationSummary;
use crate::render::RegionReport;
use std::time::Duration;

/// A compiled template
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub output: String,
    pub regions: Vec<RegionReport>,
    pub token_count: usize,
    pub duration: Duration,
    pub source_name: String,
    pub lexical_metrics: LexicalMetrics,
    pub instrumentation: InstrumentationSummary,
}

impl CompileResult {
    pub fn region_count(&self) -> usize {
        self.instrumentation.regions
    }

    pub fn log_success(&self, dialect: &str) {
        crate::log_performance!(
            crate::logging::codes::success::COMPILATION_COMPLETE,
            "Template compiled",
            duration = self.duration,
            "template" => self.source_name.as_str(),
            "dialect" => dialect,
            "regions" => self.region_count(),
            "tokens" => self.token_count,
            "output_bytes" => self.output.len()
        );
    }
}
