use super::classification::CropTable;
use crate::error::{CropRotaError, Result};
use crate::models::CropGroup;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

pub const DEFAULT_YEAR_COUNT: i32 = 4;

const MAX_RESERVED_YEARS: i32 = 64;

/// Groups that may follow a legume. Legumes leave nitrogen behind, so any heavy feeder fits.
const AFTER_LEGUME: &[CropGroup] = &[
    CropGroup::Grains,
    CropGroup::Vegetables,
    CropGroup::LeafyGreens,
    CropGroup::RootVegetables,
    CropGroup::FruitVegetables,
    CropGroup::Brassicas,
];

/// Builds multi-year rotations from a starting crop.
///
/// Each year after the first is drawn from a candidate pool chosen by the
/// previous year's groups:
/// - legume: grains or any vegetable-family crop
/// - grain: legumes
/// - vegetable family: grains, legumes, or any other non-vegetable crop
/// - unclassified: a crop from a different group (legumes when no group is known)
///
/// Selection is uniform over the pool and driven by the caller's `Rng`.
pub struct RotationGenerator<'a> {
    table: &'a CropTable,
}

impl<'a> RotationGenerator<'a> {
    pub fn new(table: &'a CropTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CropTable {
        self.table
    }

    /// Returns `year_count` crops. The first is `start_crop` exactly as given.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        start_crop: &str,
        year_count: i32,
        rng: &mut R,
    ) -> Result<Vec<String>> {
        if year_count < 1 {
            return Err(CropRotaError::InvalidConfiguration(format!(
                "year count must be at least 1, got {}",
                year_count
            )));
        }

        // Capacity is only a hint; huge counts grow as they go.
        let mut rotation = Vec::with_capacity(year_count.min(MAX_RESERVED_YEARS) as usize);
        rotation.push(start_crop.to_string());

        for _ in 1..year_count {
            let previous = rotation.last().map(String::as_str).unwrap_or(start_crop);
            let next = self.next_crop(previous, rng).ok_or_else(|| {
                CropRotaError::InvalidConfiguration(format!(
                    "no candidate crops follow '{}'",
                    previous
                ))
            })?;
            rotation.push(next);
        }

        tracing::debug!(start_crop, year_count, ?rotation, "Generated rotation");
        Ok(rotation)
    }

    /// Every crop that may be chosen for the year after `previous`.
    pub fn candidates_after(&self, previous: &str) -> BTreeSet<String> {
        if let Some(pool) = self.successor_pool(previous) {
            return pool.into_iter().map(str::to_string).collect();
        }

        let pool = match self.fallback_source_group(previous) {
            None => self.union_of(&[CropGroup::Legumes]),
            Some(current) => {
                let others: Vec<CropGroup> =
                    self.table.groups().filter(|g| *g != current).collect();
                self.union_of(&others)
            }
        };
        pool.into_iter().map(str::to_string).collect()
    }

    fn next_crop<R: Rng + ?Sized>(&self, previous: &str, rng: &mut R) -> Option<String> {
        match self.successor_pool(previous) {
            Some(pool) => pool.choose(rng).map(|crop| crop.to_string()),
            None => self.pick_from_different_group(previous, rng),
        }
    }

    /// Candidate pool for a classified crop. `None` means the crop is in no group.
    fn successor_pool(&self, previous: &str) -> Option<Vec<&str>> {
        let groups = self.table.groups_containing(previous);

        if groups.contains(&CropGroup::Legumes) {
            Some(self.union_of(AFTER_LEGUME))
        } else if groups.contains(&CropGroup::Grains) {
            Some(self.union_of(&[CropGroup::Legumes]))
        } else if groups.iter().any(|g| g.is_vegetable_family()) {
            let mut pool = self.union_of(&[CropGroup::Grains, CropGroup::Legumes]);
            for crop in self.table.all_crops() {
                if !self.table.is_vegetable_family(crop) && !pool.contains(&crop) {
                    pool.push(crop);
                }
            }
            Some(pool)
        } else {
            None
        }
    }

    // Defaults to legumes whenever the crop has no group. Kept for compatibility
    // with existing plans even though it biases unknown crops toward legumes.
    fn pick_from_different_group<R: Rng + ?Sized>(
        &self,
        previous: &str,
        rng: &mut R,
    ) -> Option<String> {
        let current = match self.fallback_source_group(previous) {
            Some(group) => group,
            None => return self.table.crops_in(CropGroup::Legumes).choose(rng).cloned(),
        };

        let others: Vec<CropGroup> = self.table.groups().filter(|g| *g != current).collect();
        let group = others.choose(rng)?;
        self.table.crops_in(*group).choose(rng).cloned()
    }

    /// Group to rotate away from, or `None` when the legume default applies.
    fn fallback_source_group(&self, previous: &str) -> Option<CropGroup> {
        if self.table.groups().count() < 2 {
            return None;
        }
        self.table.first_group_containing(previous)
    }

    /// Distinct crops of `groups`, in table order.
    fn union_of(&self, groups: &[CropGroup]) -> Vec<&str> {
        let mut pool: Vec<&str> = Vec::new();
        for group in groups {
            for crop in self.table.crops_in(*group) {
                if !pool.contains(&crop.as_str()) {
                    pool.push(crop.as_str());
                }
            }
        }
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn legumes() -> BTreeSet<String> {
        ["soybeans", "peas", "beans", "clover", "alfalfa"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn rejects_non_positive_year_count() {
        let table = CropTable::standard();
        let generator = RotationGenerator::new(&table);
        let mut rng = StdRng::seed_from_u64(1);

        for years in [0, -1, -4, i32::MIN] {
            let err = generator.generate("wheat", years, &mut rng).unwrap_err();
            assert!(
                matches!(err, CropRotaError::InvalidConfiguration(_)),
                "expected InvalidConfiguration for {}",
                years
            );
        }
    }

    #[test]
    fn length_and_first_entry_preserved() {
        let table = CropTable::standard();
        let generator = RotationGenerator::new(&table);
        let mut rng = StdRng::seed_from_u64(7);

        for start in ["Soybeans", "WHEAT", "Tomatoes", "Grapes", "unknown-crop-xyz"] {
            for years in 1..=8 {
                let rotation = generator.generate(start, years, &mut rng).unwrap();
                assert_eq!(rotation.len(), years as usize);
                assert_eq!(rotation[0], start);
                assert!(rotation.iter().skip(1).all(|c| !c.is_empty()));
            }
        }
    }

    #[test]
    fn default_year_count_is_four() {
        let table = CropTable::standard();
        let generator = RotationGenerator::new(&table);
        let rotation = generator
            .generate("corn", DEFAULT_YEAR_COUNT, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(rotation.len(), 4);
    }

    #[test]
    fn legume_is_never_followed_by_legume() {
        let table = CropTable::standard();
        let generator = RotationGenerator::new(&table);

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rotation = generator.generate("soybeans", 4, &mut rng).unwrap();
            assert_eq!(rotation[0], "soybeans");
            let second = &rotation[1];
            assert!(!legumes().contains(second), "legume {} after soybeans", second);
            let groups = table.groups_containing(second);
            assert!(groups.iter().any(|g| AFTER_LEGUME.contains(g)));
        }
    }

    #[test]
    fn grain_is_followed_by_legume() {
        let table = CropTable::standard();
        let generator = RotationGenerator::new(&table);

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rotation = generator.generate("Wheat", 4, &mut rng).unwrap();
            assert_eq!(rotation[0], "Wheat");
            assert!(legumes().contains(&rotation[1]));
        }
    }

    #[test]
    fn vegetable_is_followed_by_grain_or_legume() {
        let table = CropTable::standard();
        let generator = RotationGenerator::new(&table);

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rotation = generator.generate("Tomatoes", 2, &mut rng).unwrap();
            assert!(!table.is_vegetable_family(&rotation[1]));
            let groups = table.groups_containing(&rotation[1]);
            assert!(
                groups.contains(&CropGroup::Grains) || groups.contains(&CropGroup::Legumes)
            );
        }
    }

    #[test]
    fn unknown_crop_falls_back_to_legume() {
        let table = CropTable::standard();
        let generator = RotationGenerator::new(&table);

        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rotation = generator.generate("unknown-crop-xyz", 4, &mut rng).unwrap();
            assert_eq!(rotation[0], "unknown-crop-xyz");
            assert!(legumes().contains(&rotation[1]));
        }
    }

    #[test]
    fn blank_start_crop_is_accepted() {
        let table = CropTable::standard();
        let generator = RotationGenerator::new(&table);
        let mut rng = StdRng::seed_from_u64(11);

        let rotation = generator.generate("", 4, &mut rng).unwrap();
        assert_eq!(rotation[0], "");
        assert!(legumes().contains(&rotation[1]));

        let rotation = generator.generate("   ", 3, &mut rng).unwrap();
        assert_eq!(rotation[0], "   ");
        assert_eq!(rotation.len(), 3);
    }

    #[test]
    fn every_year_is_drawn_from_candidate_pool() {
        let table = CropTable::standard();
        let generator = RotationGenerator::new(&table);

        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rotation = generator.generate("Onions", 10, &mut rng).unwrap();
            for pair in rotation.windows(2) {
                let pool = generator.candidates_after(&pair[0]);
                assert!(
                    pool.contains(&pair[1]),
                    "{} not a valid successor of {}",
                    pair[1],
                    pair[0]
                );
            }
        }
    }

    #[test]
    fn candidate_pools_match_rotation_rules() {
        let table = CropTable::standard();
        let generator = RotationGenerator::new(&table);

        assert_eq!(generator.candidates_after("corn"), legumes());
        assert_eq!(generator.candidates_after("mystery"), legumes());

        let after_legume = generator.candidates_after("Peas");
        assert_eq!(after_legume.len(), 22);
        assert!(after_legume.is_disjoint(&legumes()));

        let after_vegetable = generator.candidates_after("kale");
        assert_eq!(after_vegetable.len(), 10);
        assert!(after_vegetable.is_superset(&legumes()));
        assert!(after_vegetable.contains("barley"));
    }

    #[test]
    fn configured_crops_join_rotation_pools() {
        let extra = std::collections::BTreeMap::from([(
            "grains".to_string(),
            vec!["Maize".to_string()],
        )]);
        let table = CropTable::with_extra_crops(&extra).unwrap();
        let generator = RotationGenerator::new(&table);

        assert!(generator.candidates_after("clover").contains("maize"));
        assert!(generator.candidates_after("lettuce").contains("maize"));
        assert_eq!(generator.candidates_after("Maize"), legumes());
    }

    #[test]
    fn long_rotations_beyond_reserved_capacity() {
        let table = CropTable::standard();
        let generator = RotationGenerator::new(&table);
        let years = MAX_RESERVED_YEARS * 4 + 3;

        let rotation = generator
            .generate("beans", years, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(rotation.len(), years as usize);
        for pair in rotation.windows(2) {
            assert!(generator.candidates_after(&pair[0]).contains(&pair[1]));
        }
    }

    #[test]
    fn seeded_source_is_reproducible() {
        let table = CropTable::standard();
        let generator = RotationGenerator::new(&table);

        let a = generator
            .generate("barley", 6, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = generator
            .generate("barley", 6, &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);
    }
}
