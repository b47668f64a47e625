pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "sentier-model")]
#[command(about = "Prepare and run a demand model from a TOML run file")]
pub struct CliConfig {
    /// Path to the TOML run file
    #[arg(short, long, default_value = "model-run.toml")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage after each phase")]
    pub monitor: bool,

    #[arg(long, help = "Validate and summarize the run without executing it")]
    pub dry_run: bool,

    /// Override run.num_samples
    #[arg(long)]
    pub num_samples: Option<usize>,

    /// Override run.outliers_raise_error
    #[arg(long)]
    pub outliers_raise_error: Option<bool>,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 套用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(num_samples) = self.num_samples {
            config.run.num_samples = num_samples;
            tracing::info!("🔧 num_samples overridden to: {}", num_samples);
        }
        if let Some(strict) = self.outliers_raise_error {
            config.run.outliers_raise_error = strict;
            tracing::info!("🔧 outliers_raise_error overridden to: {}", strict);
        }
        if self.monitor {
            let monitoring = config
                .monitoring
                .get_or_insert(toml_config::MonitoringConfig {
                    enabled: true,
                    log_format: None,
                });
            monitoring.enabled = true;
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_and_overrides() {
        let cli = CliConfig::parse_from([
            "sentier-model",
            "--num-samples",
            "50",
            "--outliers-raise-error",
            "true",
            "--monitor",
        ]);
        assert_eq!(cli.config, "model-run.toml");
        assert!(!cli.dry_run);

        let mut config = TomlConfig::from_toml_str("[model]\nname = \"m\"\n").unwrap();
        cli.apply_overrides(&mut config);
        assert_eq!(config.run.num_samples, 50);
        assert!(config.run.outliers_raise_error);
        assert!(config.monitoring_enabled());
    }
}
