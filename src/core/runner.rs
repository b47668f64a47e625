use crate::core::{DataTable, Demand, ModelContext, RunConfig, SentierModel, ValidityReport};
use crate::utils::error::{ModelError, Result};
use crate::utils::monitor::SystemMonitor;
use crate::utils::validation::Validate;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Constructed,
    Prepared,
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Constructed => "Constructed",
            Phase::Prepared => "Prepared",
            Phase::Completed => "Completed",
        };
        f.write_str(name)
    }
}

/// Drives a [`SentierModel`] through construct → prepare → run.
pub struct ModelRunner<M: SentierModel> {
    model: M,
    context: ModelContext,
    phase: Phase,
    prepared: Option<Vec<DataTable>>,
    monitor: SystemMonitor,
}

impl<M: SentierModel> ModelRunner<M> {
    pub fn new(model: M, demand: Demand, run_config: RunConfig) -> Self {
        Self::new_with_monitoring(model, demand, run_config, false)
    }

    pub fn new_with_monitoring(
        model: M,
        demand: Demand,
        run_config: RunConfig,
        enable_monitoring: bool,
    ) -> Self {
        Self {
            model,
            context: ModelContext { demand, run_config },
            phase: Phase::Constructed,
            prepared: None,
            monitor: SystemMonitor::new(enable_monitoring),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn demand(&self) -> &Demand {
        &self.context.demand
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.context.run_config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn prepared_data(&self) -> Option<&[DataTable]> {
        self.prepared.as_deref()
    }

    pub async fn get_model_data(&self) -> Result<Vec<DataTable>> {
        let tables = self.model.get_model_data(&self.context).await?;
        for table in &tables {
            tracing::debug!("Table '{}': {} records", table.name, table.len());
        }
        Ok(tables)
    }

    /// Fetches, checks and resamples model data. On failure the runner keeps
    /// its previous phase and prepared data.
    pub async fn prepare(&mut self) -> Result<()> {
        let started = Instant::now();
        tracing::info!("🔧 Preparing model '{}'", self.model.name());

        self.context.demand.validate()?;
        self.context.run_config.validate()?;

        // 取得模型資料
        let data = self.get_model_data().await?;
        tracing::info!(
            "Fetched {} table(s) with {} record(s)",
            data.len(),
            total_records(&data)
        );
        self.monitor.log_stats("Fetch");

        // 資料有效性檢查
        let data = self.check_validity(data)?;
        self.monitor.log_stats("Validity checks");

        // 重新取樣
        let data = self.model.resample(&self.context, data).await?;
        tracing::info!(
            "Resampled to {} record(s) (num_samples = {})",
            total_records(&data),
            self.context.run_config.num_samples
        );
        self.monitor.log_stats("Resample");

        self.prepared = Some(data);
        self.phase = Phase::Prepared;
        tracing::info!("✅ Model prepared in {:?}", started.elapsed());
        Ok(())
    }

    pub async fn run(&mut self) -> Result<Vec<Demand>> {
        let data = match (self.phase, self.prepared.as_deref()) {
            (Phase::Prepared | Phase::Completed, Some(data)) => data,
            _ => {
                return Err(ModelError::LifecycleError {
                    expected: Phase::Prepared.to_string(),
                    actual: self.phase.to_string(),
                })
            }
        };

        tracing::info!("🚀 Running model '{}'", self.model.name());
        let demands = self.model.run(&self.context, data).await?;

        for (index, demand) in demands.iter().enumerate() {
            demand.validate().map_err(|e| ModelError::ModelFailure {
                message: format!("output demand {} is invalid: {}", index, e),
            })?;
        }

        self.phase = Phase::Completed;
        tracing::info!("✅ Model produced {} demand(s)", demands.len());
        self.monitor.log_final_stats();
        Ok(demands)
    }

    /// `prepare` followed by `run`.
    pub async fn execute(&mut self) -> Result<Vec<Demand>> {
        self.prepare().await?;
        self.run().await
    }

    fn check_validity(&self, data: Vec<DataTable>) -> Result<Vec<DataTable>> {
        let mut report = structural_checks(&data);
        report.merge(self.model.data_validity_checks(&self.context, &data)?);
        unresolved_outliers_to_issues(&mut report, &data);

        if let Some(first) = report.issues.first() {
            tracing::error!("❌ {} data issue(s) found", report.issues.len());
            for issue in &report.issues {
                tracing::debug!("Issue in '{}': {}", issue.table, issue.message);
            }
            return Err(ModelError::InvalidData {
                table: first.table.clone(),
                message: first.message.clone(),
            });
        }

        if report.outliers.is_empty() {
            return Ok(data);
        }

        if self.context.run_config.outliers_raise_error {
            return Err(ModelError::OutliersDetected {
                count: report.outliers.len(),
            });
        }

        Ok(drop_outliers(data, &report))
    }
}

fn total_records(data: &[DataTable]) -> usize {
    data.iter().map(DataTable::len).sum()
}

/// Checks every model must pass: unique table names and, within a table,
/// the same set of columns on every record.
pub fn structural_checks(data: &[DataTable]) -> ValidityReport {
    let mut report = ValidityReport::default();
    let mut seen = HashSet::new();

    for table in data {
        if table.name.trim().is_empty() {
            report.add_issue(&table.name, "table name is empty");
        }
        if !seen.insert(table.name.as_str()) {
            report.add_issue(&table.name, "duplicate table name");
        }

        let Some(first) = table.records.first() else {
            continue;
        };
        let expected = first.columns();
        for (row, record) in table.records.iter().enumerate().skip(1) {
            let columns = record.columns();
            if columns != expected {
                report.add_issue(
                    &table.name,
                    format!(
                        "record {} has columns {:?}, expected {:?}",
                        row, columns, expected
                    ),
                );
            }
        }
    }

    report
}

/// Outliers must point at an existing record; anything else is a data issue.
fn unresolved_outliers_to_issues(report: &mut ValidityReport, data: &[DataTable]) {
    let rows: HashMap<&str, usize> = data.iter().map(|t| (t.name.as_str(), t.len())).collect();
    let (resolved, unresolved): (Vec<_>, Vec<_>) = std::mem::take(&mut report.outliers)
        .into_iter()
        .partition(|o| rows.get(o.table.as_str()).is_some_and(|len| o.row < *len));

    for outlier in unresolved {
        let message = match rows.get(outlier.table.as_str()) {
            Some(len) => format!(
                "outlier row {} is out of range ({} record(s))",
                outlier.row, len
            ),
            None => "outlier refers to an unknown table".to_string(),
        };
        report.add_issue(&outlier.table, message);
    }
    report.outliers = resolved;
}

fn drop_outliers(mut data: Vec<DataTable>, report: &ValidityReport) -> Vec<DataTable> {
    let mut flagged: HashMap<&str, HashSet<usize>> = HashMap::new();
    for outlier in &report.outliers {
        flagged
            .entry(outlier.table.as_str())
            .or_default()
            .insert(outlier.row);
    }

    for table in &mut data {
        let Some(rows) = flagged.get(table.name.as_str()) else {
            continue;
        };
        let before = table.records.len();
        let mut row = 0;
        table.records.retain(|_| {
            let keep = !rows.contains(&row);
            row += 1;
            keep
        });
        tracing::warn!(
            "⚠️ Dropped {} outlier record(s) from table '{}'",
            before - table.records.len(),
            table.name
        );
    }

    data
}
