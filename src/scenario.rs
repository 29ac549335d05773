//! Scenario runner for batch projections
//!
//! Each deal carries its own assumptions, so every projection builds its own
//! engine and deals run independently in parallel.

use rayon::prelude::*;

use crate::deal::LoadedDeal;
use crate::error::EngineResult;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};

/// Batch runner sharing one projection config across deals
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let deals = paths.iter().map(load_deal).collect::<anyhow::Result<Vec<_>>>()?;
/// for result in runner.run_batch(&deals) {
///     println!("{:.4}", result?.valuation.irr);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: ProjectionConfig,
}

impl ScenarioRunner {
    /// Create runner with the default projection config
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Run a single projection
    pub fn run(&self, loaded: &LoadedDeal) -> EngineResult<ProjectionResult> {
        let engine = ProjectionEngine::new(loaded.assumptions.clone(), self.config.clone());
        engine.project_deal(&loaded.deal)
    }

    /// Run projections for many deals in parallel; results keep input order
    pub fn run_batch(&self, deals: &[LoadedDeal]) -> Vec<EngineResult<ProjectionResult>> {
        deals.par_iter().map(|loaded| self.run(loaded)).collect()
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }
}
