use rand::Rng;
use serde::Serialize;

/// Static description of a catchable fish.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FishSpecies {
    pub key: &'static str,
    pub name: &'static str,
    pub max_weight_lbs: f64,
    pub max_length_in: f64,
    pub icon: &'static str,
    pub value_lbc: i64,
}

pub const PINK_SALMON: FishSpecies = FishSpecies {
    key: "salmon_pink",
    name: "Pink Salmon",
    max_weight_lbs: 15.0,
    max_length_in: 30.0,
    icon: "salmon_pink.png",
    value_lbc: 1,
};

pub const COHO_SALMON: FishSpecies = FishSpecies {
    key: "salmon_coho",
    name: "Coho Salmon",
    max_weight_lbs: 36.0,
    max_length_in: 42.0,
    icon: "salmon_coho.png",
    value_lbc: 2,
};

pub const SOCKEYE_SALMON: FishSpecies = FishSpecies {
    key: "salmon_sockeye",
    name: "Sockeye Salmon",
    max_weight_lbs: 15.0,
    max_length_in: 30.0,
    icon: "salmon_sockeye.png",
    value_lbc: 3,
};

pub const CHINOOK_SALMON: FishSpecies = FishSpecies {
    key: "salmon_chinook",
    name: "Chinook Salmon",
    max_weight_lbs: 80.0,
    max_length_in: 60.0,
    icon: "salmon_chinook.png",
    value_lbc: 5,
};

pub static ALL_SPECIES: [&FishSpecies; 4] = [&PINK_SALMON, &COHO_SALMON, &SOCKEYE_SALMON, &CHINOOK_SALMON];

const SIZE_MEAN: f64 = 50.0;
const SIZE_STD_DEV: f64 = 13.0;
const SIZE_MIN: f64 = 5.0;
const SIZE_MAX: f64 = 100.0;

/// Size as a fraction of the species maximum: Gaussian(50, 13) clamped to
/// [5, 100], then divided by 100.
pub fn relative_size<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // Box-Muller; 1 - u keeps the log argument in (0, 1]
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    (SIZE_MEAN + SIZE_STD_DEV * z).clamp(SIZE_MIN, SIZE_MAX) / 100.0
}

/// One landed fish before it is recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Fish {
    pub species: &'static FishSpecies,
    pub relative_size: f64,
    pub weight_lbs: f64,
    pub length_in: f64,
}

impl Fish {
    pub fn with_size(species: &'static FishSpecies, relative_size: f64) -> Self {
        Self {
            species,
            relative_size,
            weight_lbs: relative_size * species.max_weight_lbs,
            length_in: relative_size * species.max_length_in,
        }
    }

    pub fn sample<R: Rng + ?Sized>(species: &'static FishSpecies, rng: &mut R) -> Self {
        Self::with_size(species, relative_size(rng))
    }
}

/// Weighted species draw for a location.
#[derive(Debug, Clone)]
pub struct DropTable {
    drops: Vec<(&'static FishSpecies, u32)>,
    total: u32,
}

impl DropTable {
    /// `None` when the weights sum to zero or overflow `u32`.
    pub fn new(drops: Vec<(&'static FishSpecies, u32)>) -> Option<Self> {
        let total = drops.iter().try_fold(0u32, |acc, (_, w)| acc.checked_add(*w))?;
        (total > 0).then_some(Self { drops, total })
    }

    /// Fixed tables whose weights are known to be positive.
    pub(crate) fn from_weights<const N: usize>(drops: [(&'static FishSpecies, u32); N]) -> Self {
        let total = drops.iter().fold(0u32, |acc, (_, w)| acc.saturating_add(*w));
        Self {
            drops: drops.to_vec(),
            total,
        }
    }

    pub fn species(&self) -> impl Iterator<Item = &'static FishSpecies> + '_ {
        self.drops.iter().map(|(s, _)| *s)
    }

    /// Chance of each species, in table order.
    pub fn odds(&self) -> Vec<(&'static FishSpecies, f64)> {
        self.drops
            .iter()
            .map(|(s, w)| (*s, f64::from(*w) / f64::from(self.total)))
            .collect()
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static FishSpecies {
        let mut roll = rng.gen_range(0..self.total);
        for (species, weight) in &self.drops {
            if roll < *weight {
                return *species;
            }
            roll -= weight;
        }
        // unreachable while total is the sum of weights
        self.drops[self.drops.len() - 1].0
    }

    pub fn get_drop<R: Rng + ?Sized>(&self, rng: &mut R) -> Fish {
        Fish::sample(self.draw(rng), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn half_size_chinook() {
        let fish = Fish::with_size(&CHINOOK_SALMON, 0.5);
        assert_eq!(fish.weight_lbs, 40.0);
        assert_eq!(fish.length_in, 30.0);
    }

    #[test]
    fn relative_size_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let sizes: Vec<f64> = (0..5_000).map(|_| relative_size(&mut rng)).collect();
        assert!(sizes.iter().all(|s| (0.05..=1.0).contains(s)));
        let mean = sizes.iter().sum::<f64>() / sizes.len() as f64;
        assert!((mean - 0.5).abs() < 0.02, "mean {mean}");
    }

    #[test]
    fn weight_and_length_share_one_fraction() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let fish = Fish::sample(&COHO_SALMON, &mut rng);
            let by_weight = fish.weight_lbs / COHO_SALMON.max_weight_lbs;
            let by_length = fish.length_in / COHO_SALMON.max_length_in;
            assert!((by_weight - by_length).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_weights_rejected() {
        assert!(DropTable::new(vec![(&PINK_SALMON, 0)]).is_none());
        assert!(DropTable::new(Vec::new()).is_none());
        assert!(DropTable::new(vec![(&PINK_SALMON, u32::MAX), (&COHO_SALMON, 1)]).is_none());
        assert!(DropTable::new(vec![(&PINK_SALMON, u32::MAX)]).is_some());
    }

    #[test]
    fn draw_follows_weights() {
        let table = DropTable::new(vec![(&PINK_SALMON, 3), (&CHINOOK_SALMON, 1)]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let pinks = (0..4_000)
            .filter(|_| table.draw(&mut rng).key == PINK_SALMON.key)
            .count();
        assert!((2_800..3_200).contains(&pinks), "pinks {pinks}");

        let only = DropTable::new(vec![(&PINK_SALMON, 0), (&SOCKEYE_SALMON, 5)]).unwrap();
        assert!((0..50).all(|_| only.draw(&mut rng).key == SOCKEYE_SALMON.key));
    }
}
