use anyhow::Result;
use async_trait::async_trait;
use sentier_model::utils::validation::Validate;
use sentier_model::{
    DataTable, Demand, ModelContext, ModelError, ModelRunner, PassthroughModel, Phase,
    SentierModel, TableSource, TomlConfig, ValidityReport,
};
use std::path::Path;
use tempfile::TempDir;

fn write_run_dir(run_toml: &str, files: &[(&str, &str)]) -> Result<TempDir> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("run.toml"), run_toml)?;
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content)?;
    }
    Ok(dir)
}

fn load(dir: &Path) -> Result<TomlConfig> {
    let config = TomlConfig::from_file(dir.join("run.toml"))?;
    config.validate()?;
    Ok(config)
}

const RUN_FILE: &str = r#"
[model]
name = "cement-2030"
description = "Cement demand for a single year"

[demand]
product_iri = "https://example.org/product/cement"
amount = 120.5
temporal_range = ["2030-01-01", "2030-12-31"]

[run]
num_samples = 4

[data]
tables = ["kilns.csv", "prices.csv"]

[iris."https://example.org/product/cement"]
label = "Portland cement"
"#;

const KILNS: &str = "kiln,capacity\nK1,100\nK2,110\nK3,95\nK4,105\nK5,9000\n";
const PRICES: &str = "year,price\n2029,80.5\n2030,82.0\n";

/// Flags capacity values more than ten times the median.
struct CapacityModel<S: TableSource> {
    source: S,
}

#[async_trait]
impl<S: TableSource> SentierModel for CapacityModel<S> {
    fn name(&self) -> &str {
        "capacity"
    }

    async fn get_model_data(&self, _ctx: &ModelContext) -> sentier_model::Result<Vec<DataTable>> {
        self.source.load_tables().await
    }

    fn data_validity_checks(
        &self,
        _ctx: &ModelContext,
        data: &[DataTable],
    ) -> sentier_model::Result<ValidityReport> {
        let mut report = ValidityReport::default();
        for table in data.iter().filter(|t| t.name == "kilns") {
            let mut values = table.numeric_column("capacity");
            values.sort_by(|a, b| a.total_cmp(b));
            let median = values[values.len() / 2];
            for (row, record) in table.records.iter().enumerate() {
                if let Some(v) = record.get("capacity").and_then(|v| v.as_f64()) {
                    if v > median * 10.0 {
                        report.add_outlier(&table.name, row, "capacity far above median");
                    }
                }
            }
        }
        Ok(report)
    }

    async fn resample(
        &self,
        ctx: &ModelContext,
        data: Vec<DataTable>,
    ) -> sentier_model::Result<Vec<DataTable>> {
        let n = ctx.run_config.num_samples;
        Ok(data
            .into_iter()
            .map(|t| {
                let records = t.records.iter().cycle().take(n).cloned().collect();
                DataTable::new(t.name, records)
            })
            .collect())
    }

    async fn run(
        &self,
        ctx: &ModelContext,
        data: &[DataTable],
    ) -> sentier_model::Result<Vec<Demand>> {
        let kilns = data
            .iter()
            .find(|t| t.name == "kilns")
            .ok_or_else(|| ModelError::ModelFailure {
                message: "kilns table missing".to_string(),
            })?;
        let capacity: Vec<f64> = kilns.numeric_column("capacity");
        let mean = capacity.iter().sum::<f64>() / capacity.len() as f64;

        let mut demand = ctx.demand.clone();
        demand.amount = mean;
        Ok(vec![demand])
    }
}

#[tokio::test]
async fn test_passthrough_end_to_end_from_run_file() -> Result<()> {
    let dir = write_run_dir(RUN_FILE, &[("kilns.csv", KILNS), ("prices.csv", PRICES)])?;
    let config = load(dir.path())?;

    let demand = config.demand()?.clone();
    let model = PassthroughModel::new(config.table_source());
    let mut runner = ModelRunner::new(model, demand.clone(), config.run.clone());

    let demands = runner.execute().await?;

    assert_eq!(demands, vec![demand]);
    assert_eq!(runner.phase(), Phase::Completed);
    let prepared = runner.prepared_data().unwrap();
    assert_eq!(prepared.len(), 2);
    assert_eq!(prepared[0].name, "kilns");
    assert_eq!(prepared[0].len(), 5);
    assert_eq!(prepared[1].numeric_column("price"), vec![80.5, 82.0]);
    Ok(())
}

#[tokio::test]
async fn test_outliers_dropped_then_resampled() -> Result<()> {
    let dir = write_run_dir(RUN_FILE, &[("kilns.csv", KILNS), ("prices.csv", PRICES)])?;
    let config = load(dir.path())?;

    let model = CapacityModel {
        source: config.table_source(),
    };
    let mut runner = ModelRunner::new(model, config.demand()?.clone(), config.run.clone());

    let demands = runner.execute().await?;

    let kilns = &runner.prepared_data().unwrap()[0];
    assert_eq!(kilns.len(), 4);
    assert_eq!(kilns.numeric_column("capacity"), vec![100.0, 110.0, 95.0, 105.0]);
    assert_eq!(demands.len(), 1);
    assert!((demands[0].amount - 102.5).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_outliers_raise_error_when_strict() -> Result<()> {
    let strict = RUN_FILE.replace("num_samples = 4", "num_samples = 4\noutliers_raise_error = true");
    let dir = write_run_dir(&strict, &[("kilns.csv", KILNS), ("prices.csv", PRICES)])?;
    let config = load(dir.path())?;

    let model = CapacityModel {
        source: config.table_source(),
    };
    let mut runner = ModelRunner::new(model, config.demand()?.clone(), config.run.clone());

    let err = runner.prepare().await.unwrap_err();
    assert!(matches!(err, ModelError::OutliersDetected { count: 1 }));
    assert_eq!(err.exit_code(), 2);

    let err = runner.run().await.unwrap_err();
    assert!(matches!(err, ModelError::LifecycleError { .. }));
    Ok(())
}

#[tokio::test]
async fn test_missing_data_file_fails_prepare() -> Result<()> {
    let dir = write_run_dir(RUN_FILE, &[("kilns.csv", KILNS)])?;
    let config = load(dir.path())?;

    let model = PassthroughModel::new(config.table_source());
    let mut runner = ModelRunner::new(model, config.demand()?.clone(), config.run.clone());

    let err = runner.execute().await.unwrap_err();
    assert!(matches!(err, ModelError::IoError(_)));
    assert_eq!(runner.phase(), Phase::Constructed);
    Ok(())
}

#[tokio::test]
async fn test_output_serializes_as_demand_shape() -> Result<()> {
    let dir = write_run_dir(RUN_FILE, &[("kilns.csv", KILNS), ("prices.csv", PRICES)])?;
    let config = load(dir.path())?;

    let model = PassthroughModel::new(config.table_source());
    let mut runner = ModelRunner::new(model, config.demand()?.clone(), config.run.clone());
    let demands = runner.execute().await?;

    let json = serde_json::to_value(&demands)?;
    assert_eq!(
        json,
        serde_json::json!([{
            "product_iri": "https://example.org/product/cement",
            "amount": 120.5,
            "spatial_context": "https://sws.geonames.org/6295630/",
            "temporal_range": ["2030-01-01", "2030-12-31"]
        }])
    );
    Ok(())
}
