use crate::core::{DataTable, Demand, ModelContext, SentierModel, TableSource};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Template model: loads its data from a [`TableSource`], adds no checks,
/// keeps the data as-is when resampling and answers with the requested demand.
pub struct PassthroughModel<S: TableSource> {
    source: S,
}

impl<S: TableSource> PassthroughModel<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: TableSource> SentierModel for PassthroughModel<S> {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn get_model_data(&self, _ctx: &ModelContext) -> Result<Vec<DataTable>> {
        self.source.load_tables().await
    }

    async fn run(&self, ctx: &ModelContext, data: &[DataTable]) -> Result<Vec<Demand>> {
        tracing::debug!(
            "Passthrough run over {} table(s), returning input demand",
            data.len()
        );
        Ok(vec![ctx.demand.clone()])
    }
}
