use crate::core::{Iri, IriInfo, IriResolver};
use crate::utils::error::{ModelError, Result};
use std::collections::HashMap;

/// Identifier lookup backed by a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticIriResolver {
    entries: HashMap<Iri, IriInfo>,
}

impl StaticIriResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, iri: Iri, label: impl Into<String>, description: Option<String>) {
        let info = IriInfo {
            iri: iri.clone(),
            label: label.into(),
            description,
        };
        self.entries.insert(iri, info);
    }

    /// Label for display, falling back to the IRI text.
    pub fn label_or_iri(&self, iri: &Iri) -> String {
        self.resolve(iri)
            .map(|info| info.label)
            .unwrap_or_else(|_| iri.to_string())
    }
}

impl IriResolver for StaticIriResolver {
    fn resolve(&self, iri: &Iri) -> Result<IriInfo> {
        self.entries
            .get(iri)
            .cloned()
            .ok_or_else(|| ModelError::UnresolvedIri {
                iri: iri.to_string(),
            })
    }
}
