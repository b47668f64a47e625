// Domain layer: demand/run shapes and the ports models and adapters plug into.

pub mod iri;
pub mod model;
pub mod ports;
