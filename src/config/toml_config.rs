use crate::adapters::{CsvTableSource, StaticIriResolver};
use crate::core::{Demand, Iri, RunConfig};
use crate::utils::error::{ModelError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, validate_required_field,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A model run described in TOML: the demand, run settings and where data lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub model: ModelSection,
    pub demand: Option<Demand>,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub data: DataConfig,
    pub monitoring: Option<MonitoringConfig>,
    #[serde(default)]
    pub iris: BTreeMap<String, IriEntry>,
    /// Directory of the file this was loaded from; data paths are relative to it.
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IriEntry {
    pub label: String,
    pub description: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.source_dir = path.as_ref().parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ModelError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            ModelError::ConfigValidationError {
                field: "environment".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("model.name", &self.model.name)?;

        self.demand()?.validate()?;
        self.run.validate()?;

        for table in &self.data.tables {
            validate_path("data.tables", table)?;
        }
        validate_file_extensions("data.tables", &self.data.tables, &["csv"])?;

        for (key, entry) in &self.iris {
            Iri::parse(key)?;
            validate_non_empty_string(&format!("iris.\"{}\".label", key), &entry.label)?;
        }

        Ok(())
    }

    pub fn demand(&self) -> Result<&Demand> {
        validate_required_field("demand", &self.demand)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.source_dir
            .clone()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn table_source(&self) -> CsvTableSource {
        CsvTableSource::with_base_dir(&self.data_dir(), &self.data.tables)
    }

    pub fn resolver(&self) -> Result<StaticIriResolver> {
        let mut resolver = StaticIriResolver::new();
        for (key, entry) in &self.iris {
            resolver.insert(Iri::parse(key)?, entry.label.clone(), entry.description.clone());
        }
        Ok(resolver)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
