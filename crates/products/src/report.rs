//! Dashboard aggregates and export rows computed over a (usually filtered) view.

use std::collections::BTreeMap;

use serde::Serialize;

use plm_core::ProductId;

use crate::filter::Filterable;
use crate::listing::StageStatus;
use crate::material::MaterialId;
use crate::stage::Stage;

/// Number of products per stage, plus those whose stage is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageDistribution {
    counts: [usize; 7],
    unknown: usize,
}

impl StageDistribution {
    pub fn count(&self, stage: Stage) -> usize {
        self.counts[usize::from(stage.ordinal() - 1)]
    }

    pub fn unknown(&self) -> usize {
        self.unknown
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum::<usize>() + self.unknown
    }

    /// `(stage, count)` pairs in stage order, zero counts included.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, usize)> + '_ {
        Stage::ALL.into_iter().map(|stage| (stage, self.count(stage)))
    }
}

pub fn stage_distribution<T: Filterable>(items: &[T]) -> StageDistribution {
    let mut distribution = StageDistribution::default();
    for item in items {
        match item.stage() {
            StageStatus::Known(stage) => distribution.counts[usize::from(stage.ordinal() - 1)] += 1,
            StageStatus::Unknown => distribution.unknown += 1,
        }
    }
    distribution
}

/// How one material is used across a set of products.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsage {
    pub material_id: MaterialId,
    pub description: String,
    pub product_count: usize,
    /// Summed quantity per unit code.
    pub quantities: BTreeMap<String, f64>,
}

/// Material usage ordered by material id.
pub fn material_usage<T: Filterable>(items: &[T]) -> Vec<MaterialUsage> {
    let mut usage: BTreeMap<MaterialId, MaterialUsage> = BTreeMap::new();
    for item in items {
        // A BOM never repeats a material, so each line is a distinct product hit.
        for line in item.record().bom.lines() {
            let entry = usage
                .entry(line.material_id().clone())
                .or_insert_with(|| MaterialUsage {
                    material_id: line.material_id().clone(),
                    description: line.material().description.clone(),
                    product_count: 0,
                    quantities: BTreeMap::new(),
                });
            entry.product_count += 1;
            *entry
                .quantities
                .entry(line.unit_code().to_string())
                .or_insert(0.0) += line.quantity();
        }
    }
    usage.into_values().collect()
}

/// Flat, serialisable row for list exports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub current_stage: StageStatus,
    pub estimated_height: f64,
    pub estimated_weight: f64,
    pub estimated_width: f64,
    pub bom_name: String,
    pub material_count: usize,
}

pub fn export_rows<T: Filterable>(items: &[T]) -> Vec<ExportRow> {
    items
        .iter()
        .map(|item| {
            let record = item.record();
            ExportRow {
                id: record.id,
                name: record.name.clone(),
                description: record.description.clone(),
                current_stage: item.stage(),
                estimated_height: record.dimensions.height(),
                estimated_weight: record.dimensions.weight(),
                estimated_width: record.dimensions.width(),
                bom_name: record.bom.name().to_string(),
                material_count: record.bom.len(),
            }
        })
        .collect()
}
