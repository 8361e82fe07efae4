use serde::Serialize;

use crate::fishing::species::{
    DropTable, FishSpecies, ALL_SPECIES, CHINOOK_SALMON, COHO_SALMON, PINK_SALMON, SOCKEYE_SALMON,
};

#[derive(Debug, Clone, Serialize)]
pub struct Location {
    pub key: &'static str,
    pub name: &'static str,
    pub unlocked: bool,
    #[serde(skip)]
    pub drop_table: DropTable,
}

/// The static fishing world: every location and species.
#[derive(Debug, Clone)]
pub struct Fishing {
    locations: Vec<Location>,
}

impl Fishing {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    pub fn standard() -> Self {
        let river = DropTable::from_weights([
            (&PINK_SALMON, 50),
            (&COHO_SALMON, 30),
            (&SOCKEYE_SALMON, 15),
            (&CHINOOK_SALMON, 5),
        ]);
        Self::new(vec![Location {
            key: "river",
            name: "River",
            unlocked: true,
            drop_table: river,
        }])
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn location(&self, key: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.key == key)
    }

    /// Daily catch limit: one per unlocked location.
    pub fn attempts_allowed(&self) -> usize {
        self.locations.iter().filter(|l| l.unlocked).count()
    }

    pub fn species(&self) -> &'static [&'static FishSpecies] {
        &ALL_SPECIES
    }

    pub fn species_by_key(&self, key: &str) -> Option<&'static FishSpecies> {
        ALL_SPECIES.iter().copied().find(|s| s.key == key)
    }

    pub fn species_by_name(&self, name: &str) -> Option<&'static FishSpecies> {
        ALL_SPECIES.iter().copied().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_world() {
        let fishing = Fishing::standard();
        assert_eq!(fishing.attempts_allowed(), 1);
        let river = fishing.location("river").unwrap();
        let odds = river.drop_table.odds();
        assert_eq!(odds.len(), 4);
        assert_eq!(odds[0].0.name, "Pink Salmon");
        assert!((odds[0].1 - 0.5).abs() < 1e-12);
        assert!((odds[3].1 - 0.05).abs() < 1e-12);
        assert!(fishing.location("ocean").is_none());
        assert_eq!(fishing.species_by_key("salmon_coho").map(|s| s.value_lbc), Some(2));
        assert_eq!(fishing.species_by_name("Chinook Salmon").map(|s| s.icon), Some("salmon_chinook.png"));
    }
}
