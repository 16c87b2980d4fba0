//! Filter engine for product list views.
//!
//! A product passes a `FilterSpec` iff every active predicate group passes.
//! Inside the `stages` and `materials` groups any single match is enough.
//! Empty groups, unset bounds and an empty name needle filter nothing.
//!
//! Everything here is a pure function of its arguments, so it is safe to
//! re-evaluate on every render.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::listing::{ProductListing, StageStatus};
use crate::material::MaterialId;
use crate::product::{Product, ProductRecord};
use crate::stage::Stage;

/// Anything the filter engine can evaluate: descriptive data plus a stage.
pub trait Filterable {
    fn record(&self) -> &ProductRecord;

    fn stage(&self) -> StageStatus;
}

impl Filterable for Product {
    fn record(&self) -> &ProductRecord {
        Product::record(self)
    }

    fn stage(&self) -> StageStatus {
        StageStatus::Known(self.current_stage())
    }
}

impl Filterable for ProductListing {
    fn record(&self) -> &ProductRecord {
        &self.record
    }

    fn stage(&self) -> StageStatus {
        self.current_stage
    }
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn record(&self) -> &ProductRecord {
        (**self).record()
    }

    fn stage(&self) -> StageStatus {
        (**self).stage()
    }
}

/// Inclusive numeric interval; a missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min().is_none() && self.max().is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min().is_none_or(|min| value >= min) && self.max().is_none_or(|max| value <= max)
    }

    // A NaN bound cannot be compared against, so it counts as unset.
    fn min(&self) -> Option<f64> {
        self.min.filter(|v| !v.is_nan())
    }

    fn max(&self) -> Option<f64> {
        self.max.filter(|v| !v.is_nan())
    }
}

/// Transient filter configuration for one list view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub stages: BTreeSet<Stage>,
    pub materials: BTreeSet<MaterialId>,
    pub name_substring: Option<String>,
    pub height: NumericRange,
    pub width: NumericRange,
    pub weight: NumericRange,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.insert(stage);
        self
    }

    pub fn with_material(mut self, material: impl Into<MaterialId>) -> Self {
        self.materials.insert(material.into());
        self
    }

    pub fn with_name(mut self, needle: impl Into<String>) -> Self {
        self.name_substring = Some(needle.into());
        self
    }

    pub fn min_height(mut self, value: f64) -> Self {
        self.height.min = Some(value);
        self
    }

    pub fn max_height(mut self, value: f64) -> Self {
        self.height.max = Some(value);
        self
    }

    pub fn min_width(mut self, value: f64) -> Self {
        self.width.min = Some(value);
        self
    }

    pub fn max_width(mut self, value: f64) -> Self {
        self.width.max = Some(value);
        self
    }

    pub fn min_weight(mut self, value: f64) -> Self {
        self.weight.min = Some(value);
        self
    }

    pub fn max_weight(mut self, value: f64) -> Self {
        self.weight.max = Some(value);
        self
    }

    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
            && self.materials.is_empty()
            && self.name_needle().is_none()
            && self.height.is_unbounded()
            && self.width.is_unbounded()
            && self.weight.is_unbounded()
    }

    pub fn matches<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        let record = item.record();
        self.matches_stage(item.stage())
            && self.matches_materials(record)
            && self.matches_name(&record.name)
            && self.height.contains(record.dimensions.height())
            && self.width.contains(record.dimensions.width())
            && self.weight.contains(record.dimensions.weight())
    }

    fn matches_stage(&self, status: StageStatus) -> bool {
        if self.stages.is_empty() {
            return true;
        }
        status.stage().is_some_and(|stage| self.stages.contains(&stage))
    }

    fn matches_materials(&self, record: &ProductRecord) -> bool {
        if self.materials.is_empty() {
            return true;
        }
        record
            .bom
            .lines()
            .iter()
            .any(|line| self.materials.contains(line.material_id()))
    }

    fn matches_name(&self, name: &str) -> bool {
        match self.name_needle() {
            Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }

    fn name_needle(&self) -> Option<&str> {
        self.name_substring.as_deref().filter(|n| !n.is_empty())
    }
}

/// Items passing `spec`, in their original order.
pub fn apply<'a, T: Filterable>(items: &'a [T], spec: &FilterSpec) -> Vec<&'a T> {
    items.iter().filter(|item| spec.matches(*item)).collect()
}

/// Entry of the materials filter control.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialOption {
    pub material_id: MaterialId,
    pub label: String,
}

/// Distinct materials used across `items`, ordered by id.
///
/// Pass the unfiltered collection: the options must let users widen a filter
/// back out, so they cannot depend on the current view. The label is the
/// first non-empty description seen for the id, or the id itself.
pub fn derived_material_options<T: Filterable>(items: &[T]) -> Vec<MaterialOption> {
    let mut labels: BTreeMap<&MaterialId, &str> = BTreeMap::new();
    for item in items {
        for line in item.record().bom.lines() {
            let description = line.material().description.as_str();
            let entry = labels.entry(line.material_id()).or_insert(description);
            if entry.is_empty() {
                *entry = description;
            }
        }
    }

    labels
        .into_iter()
        .map(|(id, description)| MaterialOption {
            material_id: id.clone(),
            label: if description.is_empty() {
                id.to_string()
            } else {
                description.to_string()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::Bom;
    use crate::material::Material;
    use crate::product::Dimensions;
    use plm_core::ProductId;

    fn listing(name: &str, dims: (f64, f64, f64), stage: StageStatus, materials: &[&str]) -> ProductListing {
        let mut bom = Bom::new(format!("{name} BOM"));
        for id in materials {
            bom.add_line(Material::new(*id, format!("{id} desc")), 1.0, "PCS").unwrap();
        }
        ProductListing::new(
            ProductRecord {
                id: ProductId::new(),
                name: name.to_string(),
                description: String::new(),
                dimensions: Dimensions::new(dims.0, dims.1, dims.2).unwrap(),
                bom,
            },
            stage,
        )
    }

    fn known(stage: Stage) -> StageStatus {
        StageStatus::Known(stage)
    }

    fn names<T: Filterable>(items: &[&T]) -> Vec<String> {
        items.iter().map(|i| i.record().name.clone()).collect()
    }

    fn catalog_view() -> Vec<ProductListing> {
        vec![
            listing("Steel Frame", (10.0, 2.0, 5.0), known(Stage::Feasibility), &["M-1", "M-2"]),
            listing("Rubber Seal", (1.0, 0.1, 3.0), known(Stage::Production), &["M-3"]),
            listing("frame clip", (4.0, 0.5, 1.0), StageStatus::Unknown, &["M-2"]),
        ]
    }

    #[test]
    fn empty_spec_is_identity() {
        let items = catalog_view();
        let spec = FilterSpec::new();
        assert!(spec.is_empty());
        let out = apply(&items, &spec);
        assert_eq!(out.len(), items.len());
        assert!(out.iter().zip(items.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn height_range_is_inclusive() {
        // height 10, weight 2, width 5
        let items = vec![listing("P", (10.0, 2.0, 5.0), known(Stage::Concept), &[])];

        assert_eq!(apply(&items, &FilterSpec::new().min_height(5.0).max_height(20.0)).len(), 1);
        assert_eq!(apply(&items, &FilterSpec::new().min_height(10.0).max_height(10.0)).len(), 1);
        assert!(apply(&items, &FilterSpec::new().min_height(11.0)).is_empty());
    }

    #[test]
    fn width_and_weight_ranges_use_their_own_dimension() {
        let items = vec![listing("P", (10.0, 2.0, 5.0), known(Stage::Concept), &[])];
        assert_eq!(apply(&items, &FilterSpec::new().min_width(5.0).max_weight(2.0)).len(), 1);
        assert!(apply(&items, &FilterSpec::new().max_width(4.9)).is_empty());
        assert!(apply(&items, &FilterSpec::new().min_weight(2.1)).is_empty());
    }

    #[test]
    fn stage_group_selects_any_listed_stage() {
        let items = catalog_view();

        let only_production = apply(&items, &FilterSpec::new().with_stage(Stage::Production));
        assert_eq!(names(&only_production), vec!["Rubber Seal"]);

        let either = apply(
            &items,
            &FilterSpec::new()
                .with_stage(Stage::Production)
                .with_stage(Stage::Feasibility),
        );
        assert_eq!(names(&either), vec!["Steel Frame", "Rubber Seal"]);
    }

    #[test]
    fn unknown_stage_never_matches_a_stage_filter() {
        let items = catalog_view();
        let mut spec = FilterSpec::new();
        spec.stages = Stage::ALL.into_iter().collect();
        let out = apply(&items, &spec);
        assert_eq!(names(&out), vec!["Steel Frame", "Rubber Seal"]);
    }

    #[test]
    fn material_group_selects_any_listed_material() {
        let items = catalog_view();
        let out = apply(&items, &FilterSpec::new().with_material("M-2").with_material("M-3"));
        assert_eq!(names(&out), vec!["Steel Frame", "Rubber Seal", "frame clip"]);

        let none = apply(&items, &FilterSpec::new().with_material("M-404"));
        assert!(none.is_empty());
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        let items = catalog_view();
        let out = apply(&items, &FilterSpec::new().with_name("FRAME"));
        assert_eq!(names(&out), vec!["Steel Frame", "frame clip"]);

        let empty_needle = apply(&items, &FilterSpec::new().with_name(""));
        assert_eq!(empty_needle.len(), 3);
    }

    #[test]
    fn groups_combine_with_and() {
        let items = catalog_view();
        let spec = FilterSpec::new()
            .with_name("frame")
            .with_material("M-2")
            .with_stage(Stage::Feasibility);
        assert_eq!(names(&apply(&items, &spec)), vec!["Steel Frame"]);
    }

    #[test]
    fn nan_bounds_are_ignored() {
        let items = catalog_view();
        let spec = FilterSpec::new().min_height(f64::NAN);
        assert!(spec.is_empty());
        assert_eq!(apply(&items, &spec).len(), 3);
    }

    #[test]
    fn works_over_products_too() {
        use crate::product::{DraftField, ProductDraft};

        let mut draft = ProductDraft::new();
        draft.set(DraftField::Name("Hinge".into()));
        draft.set(DraftField::Description("Door hinge".into()));
        let products = vec![draft.build(ProductId::new()).unwrap()];

        assert_eq!(apply(&products, &FilterSpec::new().with_stage(Stage::Concept)).len(), 1);
        assert!(apply(&products, &FilterSpec::new().with_stage(Stage::Production)).is_empty());
    }

    #[test]
    fn material_options_cover_the_unfiltered_collection() {
        let items = catalog_view();
        let filtered = apply(&items, &FilterSpec::new().with_stage(Stage::Production));
        assert_eq!(derived_material_options(&filtered).len(), 1);

        let options = derived_material_options(&items);
        let ids: Vec<&str> = options.iter().map(|o| o.material_id.as_str()).collect();
        assert_eq!(ids, vec!["M-1", "M-2", "M-3"]);
        assert_eq!(options[0].label, "M-1 desc");
    }

    #[test]
    fn material_option_label_falls_back_to_id() {
        let mut bom = Bom::new("B");
        bom.add_line(Material::new("M-9", ""), 1.0, "PCS").unwrap();
        let items = vec![ProductListing::new(
            ProductRecord {
                id: ProductId::new(),
                name: "X".into(),
                description: String::new(),
                dimensions: Dimensions::default(),
                bom,
            },
            StageStatus::Unknown,
        )];
        assert_eq!(derived_material_options(&items)[0].label, "M-9");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_listing() -> impl Strategy<Value = ProductListing> {
            (
                "[A-Za-z ]{1,12}",
                (0.0f64..50.0, 0.0f64..50.0, 0.0f64..50.0),
                proptest::option::of(0usize..7),
                proptest::collection::btree_set(0u8..6, 0..4),
            )
                .prop_map(|(name, dims, stage, materials)| {
                    let status = stage.map_or(StageStatus::Unknown, |i| known(Stage::ALL[i]));
                    let ids: Vec<String> = materials.iter().map(|m| format!("M-{m}")).collect();
                    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
                    listing(&name, dims, status, &refs)
                })
        }

        fn arb_spec() -> impl Strategy<Value = FilterSpec> {
            (
                proptest::collection::btree_set(0usize..7, 0..3),
                proptest::collection::btree_set(0u8..6, 0..3),
                proptest::option::of("[a-z]{0,3}"),
                proptest::option::of(0.0f64..50.0),
                proptest::option::of(0.0f64..50.0),
                proptest::option::of(0.0f64..50.0),
            )
                .prop_map(|(stages, materials, name, min_h, max_w, min_wt)| FilterSpec {
                    stages: stages.into_iter().map(|i| Stage::ALL[i]).collect(),
                    materials: materials.into_iter().map(|m| MaterialId::new(format!("M-{m}"))).collect(),
                    name_substring: name,
                    height: NumericRange::new(min_h, None),
                    width: NumericRange::new(None, max_w),
                    weight: NumericRange::new(min_wt, None),
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 300,
                ..ProptestConfig::default()
            })]

            /// Property: filtering with no predicates returns the input unchanged.
            #[test]
            fn empty_spec_is_identity(items in proptest::collection::vec(arb_listing(), 0..20)) {
                let out = apply(&items, &FilterSpec::new());
                let cloned: Vec<ProductListing> = out.into_iter().cloned().collect();
                prop_assert_eq!(cloned, items);
            }

            /// Property: re-applying the same spec changes nothing.
            #[test]
            fn apply_is_idempotent(
                items in proptest::collection::vec(arb_listing(), 0..20),
                spec in arb_spec(),
            ) {
                let once: Vec<ProductListing> = apply(&items, &spec).into_iter().cloned().collect();
                let twice: Vec<ProductListing> = apply(&once, &spec).into_iter().cloned().collect();
                prop_assert_eq!(&twice, &once);

                // No hidden state: a second evaluation of the original input agrees.
                let again: Vec<ProductListing> = apply(&items, &spec).into_iter().cloned().collect();
                prop_assert_eq!(again, once);
            }
        }
    }
}
