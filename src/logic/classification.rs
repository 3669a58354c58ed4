use crate::error::{CropRotaError, Result};
use crate::models::CropGroup;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const STANDARD_TABLE: &[(CropGroup, &[&str])] = &[
    (
        CropGroup::Legumes,
        &["soybeans", "peas", "beans", "clover", "alfalfa"],
    ),
    (CropGroup::Grains, &["corn", "wheat", "barley", "oats", "rye"]),
    (
        CropGroup::Vegetables,
        &["tomatoes", "peppers", "potatoes", "carrots", "broccoli", "onions"],
    ),
    (
        CropGroup::LeafyGreens,
        &["lettuce", "spinach", "kale", "cabbage", "mustard greens"],
    ),
    (
        CropGroup::RootVegetables,
        &["carrots", "radishes", "beets", "turnips"],
    ),
    (
        CropGroup::FruitVegetables,
        &["tomatoes", "peppers", "cucumbers", "squash"],
    ),
    (
        CropGroup::Brassicas,
        &["broccoli", "cabbage", "cauliflower", "kale"],
    ),
];

/// Read-only mapping between crop names and the agronomic groups they belong to.
///
/// Crop names are stored lowercase and matched case-insensitively. A crop may sit
/// in several groups (tomatoes are both a vegetable and a fruit vegetable), so
/// lookups return every matching group.
#[derive(Debug, Clone)]
pub struct CropTable {
    groups: Vec<(CropGroup, Vec<String>)>,
    index: HashMap<String, BTreeSet<CropGroup>>,
}

impl CropTable {
    pub fn standard() -> Self {
        let groups = STANDARD_TABLE
            .iter()
            .map(|(group, crops)| (*group, crops.iter().map(|c| c.to_string()).collect()))
            .collect();
        Self::from_groups(groups)
    }

    /// Standard table extended with crops from the `rotation.extra_crops` config section.
    pub fn with_extra_crops(extra: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut groups: Vec<(CropGroup, Vec<String>)> = Self::standard().groups;

        for (key, crops) in extra {
            let group = CropGroup::from_str(key).ok_or_else(|| {
                let known: Vec<&str> = CropGroup::all().iter().map(|g| g.as_str()).collect();
                CropRotaError::InvalidConfiguration(format!(
                    "unknown crop group '{}' (expected one of: {})",
                    key,
                    known.join(", ")
                ))
            })?;

            let entry = groups
                .iter_mut()
                .find(|(g, _)| *g == group)
                .map(|(_, list)| list)
                .ok_or_else(|| {
                    CropRotaError::InvalidConfiguration(format!("crop group '{}' missing", key))
                })?;

            for crop in crops {
                let name = crop.trim().to_lowercase();
                if name.is_empty() {
                    return Err(CropRotaError::InvalidConfiguration(format!(
                        "empty crop name in group '{}'",
                        key
                    )));
                }
                if !entry.contains(&name) {
                    tracing::debug!(group = %group, crop = %name, "Adding configured crop");
                    entry.push(name);
                }
            }
        }

        Ok(Self::from_groups(groups))
    }

    fn from_groups(groups: Vec<(CropGroup, Vec<String>)>) -> Self {
        let mut index: HashMap<String, BTreeSet<CropGroup>> = HashMap::new();
        for (group, crops) in &groups {
            for crop in crops {
                index.entry(crop.clone()).or_default().insert(*group);
            }
        }
        Self { groups, index }
    }

    /// Every group containing `crop`, compared case-insensitively. Empty when unrecognized.
    pub fn groups_containing(&self, crop: &str) -> BTreeSet<CropGroup> {
        self.index
            .get(&crop.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// First group in table order whose crop list contains `crop`.
    pub fn first_group_containing(&self, crop: &str) -> Option<CropGroup> {
        let crop = crop.to_lowercase();
        self.groups
            .iter()
            .find(|(_, crops)| crops.contains(&crop))
            .map(|(group, _)| *group)
    }

    pub fn crops_in(&self, group: CropGroup) -> &[String] {
        self.groups
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, crops)| crops.as_slice())
            .unwrap_or(&[])
    }

    pub fn groups(&self) -> impl Iterator<Item = CropGroup> + '_ {
        self.groups.iter().map(|(group, _)| *group)
    }

    /// Distinct crop names in table order.
    pub fn all_crops(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.groups
            .iter()
            .flat_map(|(_, crops)| crops.iter())
            .filter(|crop| seen.insert(crop.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn is_vegetable_family(&self, crop: &str) -> bool {
        self.groups_containing(crop)
            .iter()
            .any(|g| g.is_vegetable_family())
    }
}

impl Default for CropTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let table = CropTable::standard();
        let lower = table.groups_containing("soybeans");
        assert_eq!(lower, table.groups_containing("Soybeans"));
        assert_eq!(lower, table.groups_containing("SOYBEANS"));
        assert_eq!(lower, BTreeSet::from([CropGroup::Legumes]));
    }

    #[test]
    fn overlapping_membership_is_reported() {
        let table = CropTable::standard();

        let tomatoes = table.groups_containing("tomatoes");
        assert!(tomatoes.contains(&CropGroup::Vegetables));
        assert!(tomatoes.contains(&CropGroup::FruitVegetables));
        assert_eq!(tomatoes.len(), 2);

        let kale = table.groups_containing("Kale");
        assert_eq!(
            kale,
            BTreeSet::from([CropGroup::LeafyGreens, CropGroup::Brassicas])
        );
    }

    #[test]
    fn unknown_crop_has_no_groups() {
        let table = CropTable::standard();
        assert!(table.groups_containing("unknown-crop-xyz").is_empty());
        assert!(table.groups_containing("").is_empty());
        assert!(table.groups_containing(" wheat").is_empty());
        assert_eq!(table.first_group_containing("grapes"), None);
    }

    #[test]
    fn first_group_follows_table_order() {
        let table = CropTable::standard();
        assert_eq!(
            table.first_group_containing("Carrots"),
            Some(CropGroup::Vegetables)
        );
        assert_eq!(
            table.first_group_containing("cabbage"),
            Some(CropGroup::LeafyGreens)
        );
    }

    #[test]
    fn all_crops_are_distinct() {
        let table = CropTable::standard();
        let crops = table.all_crops();
        let distinct: BTreeSet<_> = crops.iter().collect();
        assert_eq!(crops.len(), distinct.len());
        assert_eq!(crops.first(), Some(&"soybeans"));
        assert!(crops.contains(&"mustard greens"));
        assert_eq!(crops.len(), 27);
    }

    #[test]
    fn vegetable_family_detection() {
        let table = CropTable::standard();
        assert!(table.is_vegetable_family("broccoli"));
        assert!(table.is_vegetable_family("Radishes"));
        assert!(!table.is_vegetable_family("wheat"));
        assert!(!table.is_vegetable_family("clover"));
        assert!(!table.is_vegetable_family("grapes"));
    }

    #[test]
    fn extra_crops_extend_groups() {
        let extra = BTreeMap::from([
            ("grains".to_string(), vec!["Maize".to_string(), "corn".to_string()]),
            ("legumes".to_string(), vec!["pulses".to_string()]),
        ]);
        let table = CropTable::with_extra_crops(&extra).unwrap();

        assert_eq!(
            table.groups_containing("MAIZE"),
            BTreeSet::from([CropGroup::Grains])
        );
        assert_eq!(
            table.groups_containing("pulses"),
            BTreeSet::from([CropGroup::Legumes])
        );
        // Duplicates are not added twice
        assert_eq!(table.crops_in(CropGroup::Grains).len(), 6);
    }

    #[test]
    fn extra_crops_reject_unknown_group() {
        let extra = BTreeMap::from([("fruit".to_string(), vec!["grapes".to_string()])]);
        let err = CropTable::with_extra_crops(&extra).unwrap_err();
        assert!(matches!(err, CropRotaError::InvalidConfiguration(_)));
    }

    #[test]
    fn extra_crops_reject_blank_names() {
        let extra = BTreeMap::from([("grains".to_string(), vec!["  ".to_string()])]);
        assert!(CropTable::with_extra_crops(&extra).is_err());
    }
}
