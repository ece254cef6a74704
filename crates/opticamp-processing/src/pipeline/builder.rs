//! The analysis pipeline and its builder.

use super::{AnalysisOutcome, AnalysisRequest};
use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::decisions::{RecommendationEngine, RuleBasedRecommender, annotate_recommendations};
use crate::decoder::RobustDecoder;
use crate::error::{AnalysisError, Result};
use crate::filters::CampaignFilter;
use crate::normalizer::SchemaNormalizer;
use crate::reporting::ReportGenerator;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Decode → normalize → filter → recommend → aggregate, for one file at a
/// time.
///
/// The pipeline holds no per-request state; every call to
/// [`analyze`](Self::analyze) owns its data, so one pipeline can serve
/// concurrent requests.
///
/// # Example
///
/// ```rust,ignore
/// use opticamp_processing::{AnalysisPipeline, AnalysisRequest};
///
/// let pipeline = AnalysisPipeline::builder().build()?;
/// let outcome = pipeline.analyze(AnalysisRequest::new("google.csv", bytes))?;
/// println!("{}", serde_json::to_string_pretty(&outcome.report)?);
/// ```
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    decoder: RobustDecoder,
    recommender: Arc<dyn RecommendationEngine>,
    reporter: ReportGenerator,
}

static_assertions::assert_impl_all!(AnalysisPipeline: Send, Sync);

impl AnalysisPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one uploaded file.
    ///
    /// Decode and schema failures come back as
    /// [`AnalysisError::DecodeFailed`] and [`AnalysisError::SchemaMismatch`].
    pub fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisOutcome> {
        let start = Instant::now();
        let file_name = request.file_name.clone();

        match self.analyze_internal(request) {
            Ok(outcome) => {
                info!(
                    "Analysis of '{}' completed in {:?}",
                    file_name,
                    start.elapsed()
                );
                Ok(outcome)
            }
            Err(e) => {
                error!("Analysis of '{}' failed: {}", file_name, e);
                Err(e)
            }
        }
    }

    /// Read a file from disk and analyze it.
    pub fn analyze_file(
        &self,
        path: impl AsRef<Path>,
        filter: CampaignFilter,
    ) -> Result<AnalysisOutcome> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| AnalysisError::Io(e).with_context(path.display().to_string()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.analyze(AnalysisRequest {
            file_name,
            bytes,
            filter,
        })
    }

    fn analyze_internal(&self, request: AnalysisRequest) -> Result<AnalysisOutcome> {
        let AnalysisRequest {
            file_name,
            bytes,
            filter,
        } = request;

        info!("Step 1: Decoding '{}' ({} bytes)", file_name, bytes.len());
        let decoded = self
            .decoder
            .decode(&bytes)
            .map_err(|diagnostic| AnalysisError::from(diagnostic).with_context(file_name.as_str()))?;

        info!("Step 2: Normalizing schema");
        let mut table = SchemaNormalizer::normalize(decoded.frame, &file_name)?;

        if !filter.is_empty() {
            info!("Step 3: Applying filters");
            debug!("Filter: {:?}", filter);
            table = filter.apply(&table)?;
        }

        info!("Step 4: Annotating recommendations");
        annotate_recommendations(&mut table, self.recommender.as_ref())?;

        info!("Step 5: Aggregating report");
        let report = self.reporter.build_report(&table)?;

        Ok(AnalysisOutcome {
            table,
            report,
            decoding: decoded.info,
        })
    }
}

/// Builder for [`AnalysisPipeline`].
#[derive(Default)]
pub struct AnalysisPipelineBuilder {
    config: Option<AnalysisConfig>,
    recommender: Option<Arc<dyn RecommendationEngine>>,
}

static_assertions::assert_impl_all!(AnalysisPipelineBuilder: Send);

impl AnalysisPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the per-row recommendation engine.
    ///
    /// Defaults to [`RuleBasedRecommender`].
    pub fn recommender(mut self, recommender: Arc<dyn RecommendationEngine>) -> Self {
        self.recommender = Some(recommender);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<AnalysisPipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(AnalysisPipeline {
            decoder: RobustDecoder::new(&config),
            reporter: ReportGenerator::new(config.preview_rows),
            recommender: self
                .recommender
                .unwrap_or_else(|| Arc::new(RuleBasedRecommender::default())),
            config,
        })
    }
}
