use crate::domain::iri::Iri;
use crate::domain::model::{DataTable, Demand, RunConfig, ValidityReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Inputs stored when a model runner is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelContext {
    pub demand: Demand,
    pub run_config: RunConfig,
}

/// Lifecycle hooks of a concrete model.
///
/// The runner calls them in order: `get_model_data`, `data_validity_checks`,
/// `resample` (together `prepare`), then `run`.
#[async_trait]
pub trait SentierModel: Send + Sync {
    fn name(&self) -> &str {
        "model"
    }

    async fn get_model_data(&self, ctx: &ModelContext) -> Result<Vec<DataTable>>;

    /// Model-specific checks, run after the runner's structural checks.
    fn data_validity_checks(
        &self,
        _ctx: &ModelContext,
        _data: &[DataTable],
    ) -> Result<ValidityReport> {
        Ok(ValidityReport::default())
    }

    /// Draws `ctx.run_config.num_samples` samples from the validated data.
    async fn resample(&self, _ctx: &ModelContext, data: Vec<DataTable>) -> Result<Vec<DataTable>> {
        Ok(data)
    }

    async fn run(&self, ctx: &ModelContext, data: &[DataTable]) -> Result<Vec<Demand>>;
}

/// Anything that can hand over tabular model data.
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn load_tables(&self) -> Result<Vec<DataTable>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IriInfo {
    pub iri: Iri,
    pub label: String,
    pub description: Option<String>,
}

pub trait IriResolver: Send + Sync {
    fn resolve(&self, iri: &Iri) -> Result<IriInfo>;
}
