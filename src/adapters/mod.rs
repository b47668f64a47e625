// Adapters layer: concrete data sources and identifier lookup behind the domain ports.

pub mod csv_source;
pub mod memory;
pub mod resolver;

pub use csv_source::CsvTableSource;
pub use memory::InMemoryTableSource;
pub use resolver::StaticIriResolver;
