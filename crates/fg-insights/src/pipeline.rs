//! Narrative-map pipeline orchestration.
//!
//! Sequential stages: aggregate → generate → merge → persist → audit.
//! The persist step is the pipeline's only write: one conditional
//! engagement update, then exactly one history row. The history row is only
//! written after the engagement update succeeds, so a failed update never
//! produces an orphaned audit entry. A failed history insert after a
//! successful update is reported to the caller but not rolled back — an
//! accepted inconsistency window.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use fg_context::{ContextAggregator, render_document};
use fg_core::{ClientEmail, EngagementId, HistoryId, MergedInsights, NarrativeMapHistory};
use fg_llm::Provider;
use fg_store::{ConnectionPool, EngagementRepo, HistoryRepo, StoreError};

use crate::errors::InsightError;
use crate::generator::InsightGenerator;
use crate::merger::merge_insights;

/// Result of a successful generation, returned to the caller for immediate
/// display (avoids a redundant re-read).
#[derive(Clone, Debug)]
pub struct GenerateOutcome {
    /// The engagement that was updated.
    pub engagement_id: EngagementId,
    /// The full merged payload as persisted.
    pub insights: MergedInsights,
}

/// The narrative-map generation service.
pub struct NarrativeMapService {
    aggregator: ContextAggregator,
    generator: InsightGenerator,
    pool: ConnectionPool,
}

impl NarrativeMapService {
    /// Create the service over a store pool and a generation provider.
    #[must_use]
    pub fn new(pool: ConnectionPool, provider: Arc<dyn Provider>) -> Self {
        Self {
            aggregator: ContextAggregator::new(pool.clone()),
            generator: InsightGenerator::new(provider),
            pool,
        }
    }

    /// Run the full pipeline for one client.
    ///
    /// Failures before the persist step commit nothing; the stored insight
    /// state is byte-identical before and after a failed generation.
    #[instrument(skip(self), fields(client = %email))]
    pub async fn generate(
        &self,
        email: &ClientEmail,
        engagement_id: Option<&EngagementId>,
    ) -> Result<GenerateOutcome, InsightError> {
        let ctx = self.aggregator.load(email, engagement_id).await?;
        let engagement_id = ctx.engagement.id.clone();
        let expected_version = ctx.engagement.ai_insights_version;

        let document = render_document(&ctx);
        let generated = self.generator.generate(&document).await?;

        let now = Utc::now();
        let merged = merge_insights(&generated, &ctx, now);

        let payload = serde_json::to_value(&merged).map_err(|e| InsightError::Internal {
            message: format!("failed to encode merged payload: {e}"),
        })?;

        let pool = self.pool.clone();
        let to_persist = merged.clone();
        let id = engagement_id.clone();
        tokio::task::spawn_blocking(move || -> Result<(), InsightError> {
            let conn = pool.get().map_err(StoreError::from)?;
            EngagementRepo::apply_insights(&conn, &id, expected_version, &to_persist)?;
            HistoryRepo::append(
                &conn,
                &NarrativeMapHistory {
                    id: HistoryId::new(),
                    engagement_id: id,
                    field_name: "ai_generation".into(),
                    old_value: None,
                    new_value: payload,
                    changed_by: "ai".into(),
                    created_at: now,
                },
            )?;
            Ok(())
        })
        .await
        .map_err(|e| InsightError::Join(e.to_string()))??;

        info!(
            engagement = %engagement_id,
            version = merged.ai_insights_version,
            "narrative map generated"
        );

        Ok(GenerateOutcome {
            engagement_id,
            insights: merged,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test support
// ─────────────────────────────────────────────────────────────────────────────


// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
