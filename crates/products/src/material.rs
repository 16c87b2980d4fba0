//! Raw materials and read-only catalog lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Material number (catalog identity).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(String);

impl MaterialId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MaterialId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Immutable reference data owned by the material catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    #[serde(rename = "materialNumber")]
    pub id: MaterialId,
    #[serde(rename = "materialDescription")]
    pub description: String,
}

impl Material {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: MaterialId::new(id),
            description: description.into(),
        }
    }
}

/// Read-only lookup of available raw materials by identifier.
pub trait MaterialCatalog {
    fn get(&self, id: &MaterialId) -> Option<&Material>;

    fn contains(&self, id: &MaterialId) -> bool {
        self.get(id).is_some()
    }
}

/// Point-in-time copy of the catalog, keyed by material id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    materials: BTreeMap<MaterialId, Material>,
}

impl CatalogSnapshot {
    pub fn new(materials: impl IntoIterator<Item = Material>) -> Self {
        Self {
            materials: materials.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    /// Materials ordered by id.
    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl MaterialCatalog for CatalogSnapshot {
    fn get(&self, id: &MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }
}
