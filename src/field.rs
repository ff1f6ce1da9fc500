//! Random source bound to the arena, and the food field it populates.

use crate::model::{Food, Position};
use anyhow::Result;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;

/// Single random stream of a run, aware of the arena bounds.
pub struct RandomField {
    rng: ChaCha12Rng,
    size_x: f64,
    size_y: f64,
}

impl RandomField {
    /// Create a field seeded from the operating system.
    pub fn from_os_rng(size_x: f64, size_y: f64) -> Result<Self> {
        let rng = ChaCha12Rng::try_from_os_rng()?;
        Ok(Self { rng, size_x, size_y })
    }

    /// Create a reproducible field.
    pub fn from_seed(seed: u64, size_x: f64, size_y: f64) -> Self {
        let rng = ChaCha12Rng::seed_from_u64(seed);
        Self { rng, size_x, size_y }
    }

    /// Uniform scalar in `[low, high]`.
    pub fn scalar(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..=high)
    }

    /// Uniform integer in `[0, n)`.
    pub fn index(&mut self, n: usize) -> usize {
        self.rng.random_range(0..n)
    }

    /// Draw a value from `dist`.
    pub fn sample<T, D: Distribution<T>>(&mut self, dist: &D) -> T {
        dist.sample(&mut self.rng)
    }

    /// Uniform position inside the arena.
    pub fn position(&mut self) -> Position {
        let x = self.scalar(0.0, self.size_x);
        let y = self.scalar(0.0, self.size_y);
        Position::new(x, y)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

/// Food particles available during the current epoch.
#[derive(Debug, Default, Clone)]
pub struct FoodField {
    particles: Vec<Food>,
}

impl FoodField {
    /// Number of particles for an epoch, given the population it feeds.
    pub fn count_for(pop_size: usize, abundance: f64) -> usize {
        (pop_size as f64 * abundance).floor() as usize
    }

    /// Discard any remaining particles and scatter `count` new ones.
    pub fn generate(&mut self, count: usize, field: &mut RandomField) {
        self.particles.clear();
        self.particles
            .extend((0..count).map(|_| Food { position: field.position() }));
    }

    pub fn particles(&self) -> &[Food] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Remove and return the particle at `i_food`.
    pub fn consume(&mut self, i_food: usize) -> Food {
        self.particles.swap_remove(i_food)
    }
}

impl From<Vec<Food>> for FoodField {
    fn from(particles: Vec<Food>) -> Self {
        Self { particles }
    }
}
