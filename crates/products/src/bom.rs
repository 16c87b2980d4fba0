//! Bill of materials aggregate.
//!
//! A `Bom` is exclusively owned by one product and edited in place. Every
//! mutator validates before touching the line list, so a failed edit leaves
//! the bill exactly as it was.

use serde::{Deserialize, Serialize};

use crate::error::{ProductError, ProductResult};
use crate::material::{Material, MaterialCatalog, MaterialId};

/// One (material, quantity, unit) entry of a bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLine {
    material: Material,
    quantity: f64,
    #[serde(rename = "unitMeasureCode")]
    unit_code: String,
}

impl BomLine {
    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_id(&self) -> &MaterialId {
        &self.material.id
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit_code(&self) -> &str {
        &self.unit_code
    }
}

/// Field of a `BomLine` targeted by `Bom::update_line`.
#[derive(Debug, Clone, PartialEq)]
pub enum BomLineField {
    Material(MaterialId),
    Quantity(f64),
    UnitCode(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BomData", into = "BomData")]
pub struct Bom {
    name: String,
    lines: Vec<BomLine>,
}

/// Wire shape of a bill of materials; converted through the same validation as
/// interactive edits so duplicated materials surface on load.
#[derive(Serialize, Deserialize)]
struct BomData {
    #[serde(default)]
    name: String,
    #[serde(rename = "bomMaterials", default)]
    lines: Vec<BomLine>,
}

impl TryFrom<BomData> for Bom {
    type Error = ProductError;

    fn try_from(data: BomData) -> Result<Self, Self::Error> {
        let mut bom = Bom::new(data.name);
        for line in data.lines {
            bom.add_line(line.material, line.quantity, line.unit_code)?;
        }
        Ok(bom)
    }
}

impl From<Bom> for BomData {
    fn from(bom: Bom) -> Self {
        Self {
            name: bom.name,
            lines: bom.lines,
        }
    }
}

impl Bom {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[BomLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains_material(&self, id: &MaterialId) -> bool {
        self.lines.iter().any(|line| &line.material.id == id)
    }

    pub fn add_line(
        &mut self,
        material: Material,
        quantity: f64,
        unit_code: impl Into<String>,
    ) -> ProductResult<&BomLine> {
        if self.contains_material(&material.id) {
            return Err(ProductError::DuplicateMaterial {
                material_id: material.id,
            });
        }
        let quantity = validate_quantity(quantity)?;
        let unit_code = validate_unit_code(unit_code.into())?;

        self.lines.push(BomLine {
            material,
            quantity,
            unit_code,
        });
        let last = self.lines.len() - 1;
        Ok(&self.lines[last])
    }

    pub fn remove_line(&mut self, index: usize) -> ProductResult<BomLine> {
        self.check_index(index)?;
        Ok(self.lines.remove(index))
    }

    /// Replace one field of the line at `index`, validating only that field.
    pub fn update_line<C>(
        &mut self,
        index: usize,
        field: BomLineField,
        catalog: &C,
    ) -> ProductResult<&BomLine>
    where
        C: MaterialCatalog + ?Sized,
    {
        self.check_index(index)?;

        match field {
            BomLineField::Quantity(quantity) => {
                self.lines[index].quantity = validate_quantity(quantity)?;
            }
            BomLineField::UnitCode(unit_code) => {
                self.lines[index].unit_code = validate_unit_code(unit_code)?;
            }
            BomLineField::Material(material_id) => {
                let material = catalog
                    .get(&material_id)
                    .cloned()
                    .ok_or_else(|| ProductError::UnknownMaterial {
                        material_id: material_id.clone(),
                    })?;
                let taken_elsewhere = self
                    .lines
                    .iter()
                    .enumerate()
                    .any(|(i, line)| i != index && line.material.id == material_id);
                if taken_elsewhere {
                    return Err(ProductError::DuplicateMaterial { material_id });
                }
                self.lines[index].material = material;
            }
        }

        Ok(&self.lines[index])
    }

    fn check_index(&self, index: usize) -> ProductResult<()> {
        if index < self.lines.len() {
            Ok(())
        } else {
            Err(ProductError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            })
        }
    }
}

fn validate_quantity(quantity: f64) -> ProductResult<f64> {
    if quantity.is_finite() && quantity >= 0.0 {
        Ok(quantity)
    } else {
        Err(ProductError::InvalidQuantity { quantity })
    }
}

// Blank means empty after trimming; the accepted code is stored verbatim.
fn validate_unit_code(unit_code: String) -> ProductResult<String> {
    if unit_code.trim().is_empty() {
        return Err(ProductError::InvalidUnitCode);
    }
    Ok(unit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::CatalogSnapshot;

    fn steel() -> Material {
        Material::new("M-100", "Steel rod")
    }

    fn alu() -> Material {
        Material::new("M-200", "Aluminium sheet")
    }

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new([steel(), alu(), Material::new("M-300", "Rubber seal")])
    }

    fn two_line_bom() -> Bom {
        let mut bom = Bom::new("Frame");
        bom.add_line(steel(), 4.0, "PCS").unwrap();
        bom.add_line(alu(), 1.5, "M2").unwrap();
        bom
    }

    #[test]
    fn add_line_appends_in_insertion_order() {
        let bom = two_line_bom();
        let ids: Vec<&str> = bom.lines().iter().map(|l| l.material_id().as_str()).collect();
        assert_eq!(ids, vec!["M-100", "M-200"]);
        assert_eq!(bom.lines()[1].quantity(), 1.5);
        assert_eq!(bom.lines()[1].unit_code(), "M2");
    }

    #[test]
    fn add_line_rejects_duplicate_material() {
        let mut bom = Bom::new("Frame");
        bom.add_line(steel(), 1.0, "PCS").unwrap();

        let err = bom.add_line(steel(), 2.0, "KG").unwrap_err();

        assert_eq!(
            err,
            ProductError::DuplicateMaterial {
                material_id: "M-100".into()
            }
        );
        assert_eq!(bom.len(), 1);
        assert_eq!(bom.lines()[0].quantity(), 1.0);
    }

    #[test]
    fn add_line_rejects_negative_or_nan_quantity() {
        let mut bom = Bom::new("Frame");
        assert!(matches!(
            bom.add_line(steel(), -0.5, "PCS"),
            Err(ProductError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            bom.add_line(steel(), f64::NAN, "PCS"),
            Err(ProductError::InvalidQuantity { .. })
        ));
        assert!(bom.is_empty());
    }

    #[test]
    fn zero_quantity_is_allowed() {
        let mut bom = Bom::new("Frame");
        assert_eq!(bom.add_line(steel(), 0.0, "PCS").unwrap().quantity(), 0.0);
    }

    #[test]
    fn add_line_rejects_blank_unit_code() {
        let mut bom = Bom::new("Frame");
        assert_eq!(bom.add_line(steel(), 1.0, "  ").unwrap_err(), ProductError::InvalidUnitCode);
    }

    #[test]
    fn unit_codes_are_stored_as_given() {
        let mut bom = Bom::new("Frame");
        bom.add_line(steel(), 1.0, " KG ").unwrap();
        assert_eq!(bom.lines()[0].unit_code(), " KG ");

        bom.update_line(0, BomLineField::UnitCode("m2 ".into()), &catalog())
            .unwrap();
        assert_eq!(bom.lines()[0].unit_code(), "m2 ");
    }

    #[test]
    fn remove_line_checks_bounds() {
        let mut bom = two_line_bom();

        assert_eq!(
            bom.remove_line(2).unwrap_err(),
            ProductError::IndexOutOfRange { index: 2, len: 2 }
        );
        let removed = bom.remove_line(0).unwrap();
        assert_eq!(removed.material_id().as_str(), "M-100");
        assert_eq!(bom.len(), 1);
        assert_eq!(bom.lines()[0].material_id().as_str(), "M-200");
    }

    #[test]
    fn update_line_touches_only_the_given_field() {
        let mut bom = two_line_bom();
        let catalog = catalog();

        bom.update_line(0, BomLineField::Quantity(10.0), &catalog).unwrap();
        bom.update_line(0, BomLineField::UnitCode("KG".into()), &catalog).unwrap();

        let line = &bom.lines()[0];
        assert_eq!(line.quantity(), 10.0);
        assert_eq!(line.unit_code(), "KG");
        assert_eq!(line.material_id().as_str(), "M-100");
    }

    #[test]
    fn update_line_swaps_material_from_catalog() {
        let mut bom = two_line_bom();
        let line = bom
            .update_line(0, BomLineField::Material("M-300".into()), &catalog())
            .unwrap();
        assert_eq!(line.material().description, "Rubber seal");
        assert_eq!(line.quantity(), 4.0);
    }

    #[test]
    fn update_line_rejects_unknown_or_duplicate_material() {
        let mut bom = two_line_bom();
        let catalog = catalog();

        assert_eq!(
            bom.update_line(0, BomLineField::Material("M-999".into()), &catalog)
                .unwrap_err(),
            ProductError::UnknownMaterial {
                material_id: "M-999".into()
            }
        );
        assert_eq!(
            bom.update_line(0, BomLineField::Material("M-200".into()), &catalog)
                .unwrap_err(),
            ProductError::DuplicateMaterial {
                material_id: "M-200".into()
            }
        );
        // Re-selecting the line's own material is not a duplicate.
        bom.update_line(1, BomLineField::Material("M-200".into()), &catalog)
            .unwrap();
        assert_eq!(bom, two_line_bom());
    }

    #[test]
    fn update_line_checks_bounds_and_values() {
        let mut bom = two_line_bom();
        let catalog = catalog();
        assert_eq!(
            bom.update_line(5, BomLineField::Quantity(1.0), &catalog).unwrap_err(),
            ProductError::IndexOutOfRange { index: 5, len: 2 }
        );
        assert!(matches!(
            bom.update_line(1, BomLineField::Quantity(-1.0), &catalog),
            Err(ProductError::InvalidQuantity { .. })
        ));
        assert_eq!(
            bom.update_line(1, BomLineField::UnitCode(String::new()), &catalog)
                .unwrap_err(),
            ProductError::InvalidUnitCode
        );
        assert_eq!(bom, two_line_bom());
    }

    #[test]
    fn deserializing_duplicates_is_an_error() {
        let json = serde_json::json!({
            "name": "Frame",
            "bomMaterials": [
                {"material": {"materialNumber": "M-1", "materialDescription": "Bolt"}, "quantity": 1.0, "unitMeasureCode": "PCS"},
                {"material": {"materialNumber": "M-1", "materialDescription": "Bolt"}, "quantity": 2.0, "unitMeasureCode": "PCS"}
            ]
        });
        let err = serde_json::from_value::<Bom>(json).unwrap_err();
        assert!(err.to_string().contains("already part of the bill of materials"));
    }

    #[test]
    fn serializes_with_wire_names() {
        let value = serde_json::to_value(two_line_bom()).unwrap();
        assert_eq!(value["name"], "Frame");
        assert_eq!(value["bomMaterials"][0]["unitMeasureCode"], "PCS");
        assert_eq!(value["bomMaterials"][1]["material"]["materialNumber"], "M-200");
    }
}
