//! Organisms, food particles and their geometry.

use crate::error::SimError;
use crate::field::RandomField;
use serde::{Deserialize, Serialize};

/// Point in the 2-D arena.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Heritable traits of an organism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    /// Number of epochs the organism lives.
    pub longevity: u32,
    /// Whether the organism shares or contests food.
    pub altruistic: bool,
    /// Propensity towards altruism in `[0, 1]`.
    pub altruism: f64,
    /// Distance covered per movement step.
    pub velocity: f64,
    /// Energy budget restored at the start of every epoch.
    pub energy: f64,
    /// Energy spent per unit of velocity on each effortful step.
    pub energy_release_rate: f64,
}

/// A food particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub position: Position,
}

/// Agent of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    id: u64,
    pub traits: Traits,

    pub position: Position,
    pub start_position: Position,
    pub energy: f64,

    /// Meals obtained during the current epoch.
    pub meals: f64,
    /// Epochs lived so far.
    pub age: u32,

    /// Ids of the organisms this one gave a meal to.
    pub shared_to: Vec<u64>,
    /// Ids of the organisms this one received a meal from.
    pub received_from: Vec<u64>,
}

impl Organism {
    /// Create a new organism at `position` with the given traits.
    pub fn new(id: u64, traits: Traits, position: Position) -> Self {
        Self {
            id,
            energy: traits.energy,
            traits,
            position,
            start_position: position,
            meals: 0.0,
            age: 0,
            shared_to: Vec::new(),
            received_from: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Produce an offspring with a new id, a fresh position and no history.
    pub fn offspring(&self, id: u64, position: Position) -> Self {
        Self::new(id, self.traits.clone(), position)
    }

    /// Move one step of length `velocity` towards `target`.
    ///
    /// Never overshoots the target. Does nothing when the organism is already
    /// at the target, or when `energy_limited` is set and the energy is spent.
    pub fn move_toward(&mut self, target: Position, effortless: bool, energy_limited: bool) {
        if energy_limited && self.energy <= 0.0 {
            return;
        }

        let distance = self.position.distance(&target);
        if distance <= f64::EPSILON {
            return;
        }

        let velocity = self.traits.velocity;
        if velocity >= distance {
            self.position = target;
        } else {
            let ratio = velocity / distance;
            self.position.x += ratio * (target.x - self.position.x);
            self.position.y += ratio * (target.y - self.position.y);
        }

        if !effortless {
            self.energy -= velocity * self.traits.energy_release_rate;
        }
    }

    /// Whether the organism can still move this epoch.
    pub fn can_move(&self, energy_limited: bool) -> bool {
        !energy_limited || self.energy > 0.0
    }

    /// Index of the food particle nearest to the organism.
    pub fn find_nearest_food(&self, food: &[Food]) -> Result<usize, SimError> {
        food.iter()
            .map(|f| self.position.distance(&f.position))
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i_food, _)| i_food)
            .ok_or(SimError::EmptyFoodSet)
    }

    /// Mutate the altruism propensity, the velocity or both.
    ///
    /// Each selected trait is multiplied by a factor drawn uniformly from
    /// `[1, mutability]`. The altruism propensity is clamped to `[0, 1]`.
    pub fn mutate(&mut self, field: &mut RandomField, mutability: f64) {
        let choice = field.index(3);
        if choice == 0 || choice == 2 {
            self.traits.altruism *= field.scalar(1.0, mutability);
        }
        if choice == 1 || choice == 2 {
            self.traits.velocity *= field.scalar(1.0, mutability);
        }
        self.traits.altruism = self.traits.altruism.clamp(0.0, 1.0);
    }

    /// Transfer one meal to `recipient`, recording the transaction on both sides.
    pub fn share(&mut self, recipient: &mut Organism) {
        self.meals -= 1.0;
        recipient.meals += 1.0;
        self.shared_to.push(recipient.id);
        recipient.received_from.push(self.id);
    }

    /// Prepare the organism for the next epoch.
    pub fn reset_for_next_epoch(&mut self) {
        self.position = self.start_position;
        self.meals = 0.0;
        self.energy = self.traits.energy;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn traits(altruistic: bool) -> Traits {
        Traits {
            longevity: 2,
            altruistic,
            altruism: if altruistic { 1.0 } else { 0.0 },
            velocity: 1.0,
            energy: 10.0,
            energy_release_rate: 0.1,
        }
    }

    pub(crate) fn organism_at(id: u64, x: f64, y: f64) -> Organism {
        Organism::new(id, traits(true), Position::new(x, y))
    }

    #[test]
    fn moves_one_step_toward_target() {
        let mut org = organism_at(0, 0.0, 0.0);
        org.move_toward(Position::new(3.0, 4.0), false, true);
        assert!((org.position.x - 0.6).abs() < 1e-12);
        assert!((org.position.y - 0.8).abs() < 1e-12);
        assert!((org.energy - 9.9).abs() < 1e-12);
    }

    #[test]
    fn does_not_overshoot_target() {
        let mut org = organism_at(0, 0.0, 0.0);
        org.traits.velocity = 10.0;
        org.move_toward(Position::new(1.0, 1.0), true, true);
        assert_eq!(org.position, Position::new(1.0, 1.0));
        assert_eq!(org.energy, 10.0);
    }

    #[test]
    fn stays_put_when_already_at_target() {
        let mut org = organism_at(0, 2.0, 2.0);
        org.move_toward(Position::new(2.0, 2.0), false, true);
        assert_eq!(org.position, Position::new(2.0, 2.0));
        assert!(org.position.x.is_finite());
        assert_eq!(org.energy, 10.0);
    }

    #[test]
    fn exhausted_organism_does_not_move() {
        let mut org = organism_at(0, 0.0, 0.0);
        org.energy = 0.0;
        org.move_toward(Position::new(5.0, 0.0), false, true);
        assert_eq!(org.position, Position::new(0.0, 0.0));
        assert!(!org.can_move(true));

        org.move_toward(Position::new(5.0, 0.0), false, false);
        assert_eq!(org.position, Position::new(1.0, 0.0));
    }

    #[test]
    fn finds_nearest_food() {
        let org = organism_at(0, 5.0, 5.0);
        let food = [
            Food { position: Position::new(0.0, 0.0) },
            Food { position: Position::new(6.0, 5.0) },
            Food { position: Position::new(9.0, 9.0) },
        ];
        assert_eq!(org.find_nearest_food(&food), Ok(1));
        assert_eq!(org.find_nearest_food(&[]), Err(SimError::EmptyFoodSet));
    }

    #[test]
    fn mutation_stays_in_bounds() {
        let mut field = RandomField::from_seed(3, 10.0, 10.0);
        let mut org = organism_at(0, 0.0, 0.0);
        org.traits.altruism = 0.9;
        for _ in 0..50 {
            org.mutate(&mut field, 1.5);
            assert!((0.0..=1.0).contains(&org.traits.altruism));
            assert!(org.traits.velocity >= 1.0);
        }
    }

    #[test]
    fn sharing_records_both_sides() {
        let mut donor = organism_at(1, 0.0, 0.0);
        let mut recipient = organism_at(2, 0.0, 0.0);
        donor.meals = 2.0;
        donor.share(&mut recipient);
        assert_eq!(donor.meals, 1.0);
        assert_eq!(recipient.meals, 1.0);
        assert_eq!(donor.shared_to, vec![2]);
        assert_eq!(recipient.received_from, vec![1]);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut org = organism_at(0, 1.0, 1.0);
        org.move_toward(Position::new(4.0, 5.0), false, true);
        org.meals = 2.0;

        org.reset_for_next_epoch();
        let once = org.clone();
        org.reset_for_next_epoch();
        assert_eq!(org, once);
        assert_eq!(org.position, Position::new(1.0, 1.0));
        assert_eq!(org.meals, 0.0);
    }
}
