//! Seed orchestrator
//!
//! One reconciliation pass over a seed document:
//!
//! ```text
//! prior status ──► select categories ──► for each, in fixed order:
//!                                           sync_category
//!                                             ok  ──► remove from unfinished
//!                                             err ──► record kind + message, continue
//!                                        ──► new status (+ version if complete)
//! ```
//!
//! A failing category never stops the pass; later categories are still
//! attempted. After every pass the `seeder_seed_complete` gauge, labelled
//! with the seed name, is set to 1 when the pass completed and 0 otherwise.

use crate::config::RequeuePolicy;
use crate::session::SeedSession;
use crate::sync::SyncSummary;
use seeder_types::{Category, CategoryFailure, SeedDocument, SeedSpec, SeedStatus};
use serde::Serialize;
use std::time::Duration;
use tracing::Instrument;

/// Gauge set per seed after each pass: 1 complete, 0 incomplete
pub const SEED_COMPLETE_GAUGE: &str = "seeder_seed_complete";

/// Publish whether the last pass over `seed` completed
pub fn record_completion(seed: &str, complete: bool) {
    metrics::gauge!(SEED_COMPLETE_GAUGE, "seed" => seed.to_owned())
        .set(if complete { 1.0 } else { 0.0 });
}

/// Result of one category within a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CategoryOutcome {
    /// Every entity applied
    Synced(SyncSummary),
    /// Stopped at the first failing entity
    Failed(CategoryFailure),
}

/// Per-category line of a pass report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    /// Category the line is about
    pub category: Category,
    /// What the pass did with it
    #[serde(flatten)]
    pub outcome: CategoryOutcome,
}

impl CategoryReport {
    /// Check if the category applied cleanly
    #[inline]
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, CategoryOutcome::Synced(_))
    }
}

/// Result of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Status to store for the document
    pub status: SeedStatus,
    /// No category failed in this pass
    pub complete: bool,
    /// Attempted categories in processing order
    pub reports: Vec<CategoryReport>,
}

impl ReconcileOutcome {
    /// Delay until the document should be reconciled again
    #[inline]
    #[must_use]
    pub fn requeue_after(&self, policy: &RequeuePolicy) -> Duration {
        policy.after(self.complete)
    }

    /// Categories attempted in this pass
    #[must_use]
    pub fn attempted(&self) -> Vec<Category> {
        self.reports.iter().map(|r| r.category).collect()
    }

    /// Totals over all categories that applied
    #[must_use]
    pub fn totals(&self) -> SyncSummary {
        self.reports
            .iter()
            .filter_map(|r| match &r.outcome {
                CategoryOutcome::Synced(summary) => Some(*summary),
                CategoryOutcome::Failed(_) => None,
            })
            .fold(SyncSummary::default(), |mut acc, s| {
                acc.created += s.created;
                acc.updated += s.updated;
                acc.unchanged += s.unchanged;
                acc
            })
    }
}

/// Reconciles seed documents against one session
#[derive(Debug)]
pub struct SeedOrchestrator {
    session: SeedSession,
}

impl SeedOrchestrator {
    /// Create orchestrator over a session
    #[inline]
    #[must_use]
    pub fn new(session: SeedSession) -> Self {
        Self { session }
    }

    /// Underlying session
    #[inline]
    #[must_use]
    pub fn session(&self) -> &SeedSession {
        &self.session
    }

    /// Categories a pass attempts
    ///
    /// Only the previously failed categories when there are any, otherwise
    /// every category the seed declares. Always in processing order.
    #[must_use]
    pub fn select_categories(spec: &SeedSpec, prior: &SeedStatus) -> Vec<Category> {
        if prior.is_complete() {
            spec.present_categories()
        } else {
            Category::ALL
                .into_iter()
                .filter(|c| prior.failure(*c).is_some())
                .collect()
        }
    }

    /// Run one reconciliation pass
    ///
    /// Never fails as a whole; category failures are recorded in the
    /// returned status.
    pub async fn reconcile(&self, document: &SeedDocument, prior: &SeedStatus) -> ReconcileOutcome {
        let categories = Self::select_categories(&document.spec, prior);
        tracing::info!(
            seed = %document.name,
            version = document.resource_version.as_deref().unwrap_or("-"),
            categories = categories.len(),
            retry = !prior.is_complete(),
            "reconciling seed"
        );

        let synchronizer = self.session.synchronizer();
        let mut status = prior.clone();
        let mut reports = Vec::with_capacity(categories.len());

        for category in categories {
            let span = tracing::info_span!("seed_category", seed = %document.name, %category);
            let result = synchronizer
                .sync_category(category, &document.spec)
                .instrument(span)
                .await;

            let outcome = match result {
                Ok(summary) => {
                    tracing::debug!(
                        %category,
                        created = summary.created,
                        updated = summary.updated,
                        unchanged = summary.unchanged,
                        "category applied"
                    );
                    status.mark_finished(category);
                    CategoryOutcome::Synced(summary)
                }
                Err(e) => {
                    tracing::warn!(%category, kind = ?e.kind(), error = %e, "category failed");
                    let failure = CategoryFailure::new(e.kind(), e.to_string());
                    status.mark_failed(category, failure.clone());
                    CategoryOutcome::Failed(failure)
                }
            };
            reports.push(CategoryReport { category, outcome });
        }

        let complete = reports.iter().all(CategoryReport::succeeded);
        if complete {
            status
                .reconciled_resource_version
                .clone_from(&document.resource_version);
        }
        tracing::info!(
            seed = %document.name,
            complete,
            unfinished = status.unfinished_seeds.len(),
            "seed reconciled"
        );
        record_completion(&document.name, complete);

        ReconcileOutcome {
            status,
            complete,
            reports,
        }
    }

    /// Close the underlying session
    pub async fn shutdown(self) {
        self.session.shutdown().await;
    }
}
