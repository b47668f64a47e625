pub mod passthrough;
pub mod runner;

pub use crate::domain::iri::Iri;
pub use crate::domain::model::{
    DataIssue, DataTable, Demand, Outlier, Record, RunConfig, TemporalRange, ValidityReport,
};
pub use crate::domain::ports::{IriInfo, IriResolver, ModelContext, SentierModel, TableSource};
pub use crate::utils::error::Result;
pub use passthrough::PassthroughModel;
pub use runner::{ModelRunner, Phase};
