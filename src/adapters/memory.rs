use crate::core::{DataTable, TableSource};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Hands out a fixed set of tables, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTableSource {
    tables: Vec<DataTable>,
}

impl InMemoryTableSource {
    pub fn new(tables: Vec<DataTable>) -> Self {
        Self { tables }
    }
}

#[async_trait]
impl TableSource for InMemoryTableSource {
    async fn load_tables(&self) -> Result<Vec<DataTable>> {
        Ok(self.tables.clone())
    }
}
