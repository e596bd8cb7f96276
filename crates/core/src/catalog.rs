use serde::{Deserialize, Serialize};

/// Selectable option lists offered by the wizard's button stages.
/// Companies and districts are deployment data and come from config;
/// the defaults match the seed deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub companies: Vec<String>,
    pub districts: Vec<String>,
    pub property_types: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            companies: to_owned(&["InmoPlus", "VentaMax", "CasaFácil", "TopCasa", "PropiedadPro"]),
            districts: to_owned(&[
                "Miraflores",
                "San Isidro",
                "La Molina",
                "Surco",
                "Barranco",
                "Chorrillos",
            ]),
            property_types: to_owned(&[
                "Apartment",
                "House",
                "Commercial unit",
                "Office",
                "Land",
                "Warehouse",
            ]),
        }
    }
}

impl Catalog {
    pub fn has_company(&self, name: &str) -> bool {
        self.companies.iter().any(|company| company == name)
    }

    pub fn has_district(&self, name: &str) -> bool {
        self.districts.iter().any(|district| district == name)
    }

    pub fn has_property_type(&self, name: &str) -> bool {
        self.property_types.iter().any(|property_type| property_type == name)
    }
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::Catalog;

    #[test]
    fn default_catalog_is_non_empty() {
        let catalog = Catalog::default();
        assert!(!catalog.companies.is_empty());
        assert!(!catalog.districts.is_empty());
        assert!(!catalog.property_types.is_empty());
    }

    #[test]
    fn membership_checks_are_exact() {
        let catalog = Catalog::default();
        assert!(catalog.has_company("InmoPlus"));
        assert!(!catalog.has_company("inmoplus"));
        assert!(catalog.has_district("Surco"));
        assert!(!catalog.has_property_type("Castle"));
    }
}
