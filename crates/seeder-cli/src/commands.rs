//! Subcommand implementations
//!
//! Kept apart from argument parsing so they can be driven from tests.

use anyhow::{Context, Result};
use seeder_core::{
    CallCounts, MemoryApi, ReconcileOutcome, RemoteSnapshot, SeedOrchestrator, SeedSession,
    SeederConfig,
};
use seeder_types::{Category, SeedDocument, SeedStatus, ValidationError};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

/// Problems found in a seed document
pub(crate) fn validate(seed: &Path) -> Result<Vec<(Category, ValidationError)>> {
    let document = SeedDocument::load(seed)
        .with_context(|| format!("loading seed {}", seed.display()))?;
    tracing::debug!(seed = %document.name, "validating");
    Ok(document.spec.validate())
}

/// Options for an offline reconciliation run
#[derive(Debug, Clone)]
pub(crate) struct SimulateOptions<'a> {
    pub(crate) seed: &'a Path,
    pub(crate) state: Option<&'a Path>,
    pub(crate) save_state: Option<&'a Path>,
    pub(crate) config: Option<&'a Path>,
    pub(crate) passes: usize,
}

/// One reconciliation pass as printed
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PassReport {
    pub(crate) pass: usize,
    pub(crate) requeue_after_secs: u64,
    #[serde(flatten)]
    pub(crate) outcome: ReconcileOutcome,
}

/// Result of an offline reconciliation run
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SimulationReport {
    pub(crate) seed: String,
    pub(crate) passes: Vec<PassReport>,
    pub(crate) calls: Vec<CallLine>,
}

/// Remote calls of one operation and kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct CallLine {
    pub(crate) operation: String,
    pub(crate) kind: String,
    pub(crate) count: usize,
}

impl SimulationReport {
    /// Check if the last pass applied every category
    #[must_use]
    pub(crate) fn converged(&self) -> bool {
        self.passes.last().is_some_and(|p| p.outcome.complete)
    }

    /// Human-readable report
    #[must_use]
    pub(crate) fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Seed: {}", self.seed);
        for pass in &self.passes {
            let totals = pass.outcome.totals();
            let _ = writeln!(
                out,
                "Pass {}: {} (created {}, updated {}, unchanged {}), requeue in {}s",
                pass.pass,
                if pass.outcome.complete { "complete" } else { "incomplete" },
                totals.created,
                totals.updated,
                totals.unchanged,
                pass.requeue_after_secs,
            );
            for (category, failure) in &pass.outcome.status.unfinished_seeds {
                let _ = writeln!(
                    out,
                    "  {category}: {} ({:?})",
                    failure.message, failure.kind
                );
            }
        }
        let _ = writeln!(out, "Remote calls:");
        for line in &self.calls {
            let _ = writeln!(out, "  {:<7} {:<16} {}", line.operation, line.kind, line.count);
        }
        out
    }
}

/// Reconcile a seed against an in-memory remote
pub(crate) async fn simulate(options: &SimulateOptions<'_>) -> Result<SimulationReport> {
    let config = match options.config {
        Some(path) => SeederConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SeederConfig::default(),
    };
    let document = SeedDocument::load(options.seed)
        .with_context(|| format!("loading seed {}", options.seed.display()))?;
    let snapshot = match options.state {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading remote state {}", path.display()))?;
            RemoteSnapshot::from_json_str(&content)
                .with_context(|| format!("parsing remote state {}", path.display()))?
        }
        None => RemoteSnapshot::default(),
    };

    let api = Arc::new(MemoryApi::from_snapshot(snapshot));
    let policy = config.requeue;
    let orchestrator = SeedOrchestrator::new(SeedSession::start(api.clone(), config));

    let mut status = SeedStatus::default();
    let mut passes = Vec::with_capacity(options.passes);
    for pass in 1..=options.passes.max(1) {
        let outcome = orchestrator.reconcile(&document, &status).await;
        status = outcome.status.clone();
        passes.push(PassReport {
            pass,
            requeue_after_secs: outcome.requeue_after(&policy).as_secs(),
            outcome,
        });
    }
    orchestrator.shutdown().await;

    if let Some(path) = options.save_state {
        let json = serde_json::to_string_pretty(&api.snapshot())?;
        std::fs::write(path, json)
            .with_context(|| format!("writing remote state {}", path.display()))?;
    }

    Ok(SimulationReport {
        seed: document.name,
        passes,
        calls: call_lines(&api.call_counts()),
    })
}

fn call_lines(counts: &CallCounts) -> Vec<CallLine> {
    counts
        .iter()
        .map(|((operation, kind), count)| CallLine {
            operation: operation.to_string(),
            kind: kind.to_string(),
            count: *count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const SEED: &str = r#"
name: cli-seed
spec:
  roles:
    - name: admin
  domains:
    - name: acme
      description: Acme
"#;

    #[test]
    fn validate_reports_problems() {
        let good = write_temp(".yaml", SEED);
        assert!(validate(good.path()).unwrap().is_empty());

        let bad = write_temp(
            ".yaml",
            "name: bad\nspec:\n  rbac_policies:\n    - {object_type: port, object_id: p, action: a, target: x@y}\n",
        );
        let problems = validate(bad.path()).unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].0, Category::RbacPolicies);
    }

    #[tokio::test]
    async fn simulate_converges_and_second_pass_is_noop() {
        let seed = write_temp(".yaml", SEED);
        let report = simulate(&SimulateOptions {
            seed: seed.path(),
            state: None,
            save_state: None,
            config: None,
            passes: 2,
        })
        .await
        .unwrap();

        assert!(report.converged());
        assert_eq!(report.passes[0].outcome.totals().created, 2);
        assert!(report.passes[1].outcome.totals().is_noop());
        assert!(report.to_text().contains("Pass 2: complete"));
    }

    #[tokio::test]
    async fn simulate_loads_and_saves_state() {
        let seed = write_temp(".yaml", SEED);
        let state = write_temp(
            ".json",
            r#"{"domain": [{"id": "d-1", "attributes": {"name": "acme", "description": "old"}}]}"#,
        );
        let saved = NamedTempFile::new().unwrap();

        let report = simulate(&SimulateOptions {
            seed: seed.path(),
            state: Some(state.path()),
            save_state: Some(saved.path()),
            config: None,
            passes: 1,
        })
        .await
        .unwrap();

        assert_eq!(report.passes[0].outcome.totals().updated, 1);
        let content = std::fs::read_to_string(saved.path()).unwrap();
        let snapshot = RemoteSnapshot::from_json_str(&content).unwrap();
        let domains = snapshot.entities(seeder_types::ResourceKind::Domain);
        assert_eq!(domains[0].str_attribute("description"), Some("Acme"));
    }
}
