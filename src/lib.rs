pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::toml_config::TomlConfig;

pub use crate::adapters::{CsvTableSource, InMemoryTableSource, StaticIriResolver};
pub use crate::core::{
    DataTable, Demand, Iri, IriResolver, ModelContext, ModelRunner, PassthroughModel, Phase,
    Record, RunConfig, SentierModel, TableSource, TemporalRange, ValidityReport,
};
pub use crate::utils::error::{ModelError, Result};
