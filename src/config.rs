use crate::altruism::AltruismPolicy;
use crate::competition::CompetitionPolicy;
use crate::error::SimError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub arena: ArenaConfig,
    pub init: InitConfig,
    pub model: ModelConfig,
    pub food: FoodConfig,
    pub rewards: RewardConfig,
    pub run: RunConfig,
}

/// Arena dimensions.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub size_x: f64,
    pub size_y: f64,
}

/// Initial population and its traits.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    /// Initial number of organisms.
    pub pop_size: usize,
    /// Fraction of the initial population that is altruistic.
    pub altruistic_fraction: f64,
    /// Distance covered per movement step.
    pub velocity: f64,
    /// Initial altruism propensity.
    pub altruism: f64,
    /// Energy budget available at the start of every epoch.
    pub energy: f64,
    /// Energy spent per unit of velocity on each effortful step.
    pub energy_release_rate: f64,
    /// Number of epochs an organism lives.
    pub longevity: u32,
}

/// Competition, fitness and mutation parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub competition: CompetitionPolicy,
    pub altruism: AltruismPolicy,

    /// Percentage of reproduction chance granted per meal.
    pub reproduction_factor: f64,
    /// Percentage chance that a clone is mutated.
    pub mutation_chance: f64,
    /// Upper bound of the multiplicative mutation factor.
    pub mutability: f64,

    /// Distance within which an organism can eat a food particle.
    pub feeding_range: f64,
    /// Number of meals after which an organism stops seeking food.
    pub meal_cap: u32,

    /// Organisms without meals die at the end of the epoch.
    pub starvation: bool,
    /// Organisms stop moving once their energy is exhausted.
    pub energy_limited: bool,
    /// Movement does not consume energy.
    pub effortless_movement: bool,
}

/// Food regeneration parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct FoodConfig {
    /// Ratio of food particles to population size.
    pub abundance: f64,
    /// Food count derives from the initial population size rather than the current one.
    pub static_generation: bool,
}

/// Meal rewards granted to competing pairs.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Reward for each member of an altruistic pair.
    pub cooperative_share: f64,
    /// Reward for each member of a selfish pair.
    pub conflict_cost: f64,
    /// Reward for the selfish member of a mixed pair.
    pub selfish_take: f64,
    /// Reward for the altruistic member of a mixed pair.
    pub leftovers: f64,
}

/// Run limits and output cadence.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of independent runs.
    pub runs: usize,
    /// Maximum number of epochs per run.
    pub max_epochs: usize,
    /// Maximum number of movement steps per pursuit epoch.
    pub max_steps_per_epoch: usize,
    /// Number of steps between rendered frames.
    pub render_every: usize,
    /// Random seed; drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    /// Serialize the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("failed to serialize config")
    }

    pub fn validate(&self) -> Result<(), SimError> {
        check_float(self.arena.size_x, f64::MIN_POSITIVE.., "arena size x")?;
        check_float(self.arena.size_y, f64::MIN_POSITIVE.., "arena size y")?;

        check_num(self.init.pop_size, 1..100_000, "initial population size")?;
        check_float(self.init.altruistic_fraction, 0.0..=1.0, "altruistic fraction")?;
        check_float(self.init.velocity, 0.0.., "velocity")?;
        check_float(self.init.altruism, 0.0..=1.0, "altruism propensity")?;
        check_float(self.init.energy, 0.0.., "energy")?;
        check_float(self.init.energy_release_rate, 0.0.., "energy release rate")?;
        check_num(self.init.longevity, 1.., "longevity")?;

        check_float(self.model.reproduction_factor, 0.0..=100.0, "reproduction factor")?;
        check_float(self.model.mutation_chance, 0.0..=100.0, "mutation chance")?;
        check_float(self.model.mutability, 1.0.., "mutability")?;
        check_float(self.model.feeding_range, f64::MIN_POSITIVE.., "feeding range")?;
        check_num(self.model.meal_cap, 1.., "meal cap")?;
        if self.model.altruism == AltruismPolicy::ConflictResolution
            && self.model.competition != CompetitionPolicy::LotteryAssignment
        {
            return Err(SimError::InvalidConfiguration(
                "conflict resolution requires the lottery competition policy".to_string(),
            ));
        }

        check_float(self.food.abundance, 0.0..=100.0, "food abundance")?;

        self.rewards.validate()?;

        check_num(self.run.runs, 1.., "number of runs")?;
        check_num(self.run.max_epochs, 1.., "maximum number of epochs")?;
        check_num(self.run.max_steps_per_epoch, 1.., "maximum steps per epoch")?;
        check_num(self.run.render_every, 1.., "steps between frames")?;

        Ok(())
    }
}

impl RewardConfig {
    fn validate(&self) -> Result<(), SimError> {
        check_float(self.cooperative_share, 0.0..1.0, "cooperative share")?;
        check_float(self.conflict_cost, 0.0..1.0, "conflict cost")?;
        check_float(self.selfish_take, 0.0..=1.0, "selfish take")?;
        check_float(self.leftovers, 0.0..1.0, "leftovers")?;

        if self.cooperative_share <= self.conflict_cost {
            return Err(SimError::InvalidConfiguration(format!(
                "cooperative share ({}) must exceed conflict cost ({})",
                self.cooperative_share, self.conflict_cost
            )));
        }
        if self.selfish_take <= self.leftovers {
            return Err(SimError::InvalidConfiguration(format!(
                "selfish take ({}) must exceed leftovers ({})",
                self.selfish_take, self.leftovers
            )));
        }
        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R, what: &str) -> Result<(), SimError>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        return Err(SimError::InvalidConfiguration(format!(
            "{what} must be in the range {range:?}, but is {num:?}"
        )));
    }
    Ok(())
}

fn check_float<R>(num: f64, range: R, what: &str) -> Result<(), SimError>
where
    R: RangeBounds<f64> + Debug,
{
    if !num.is_finite() {
        return Err(SimError::InvalidConfiguration(format!(
            "{what} must be finite, but is {num:?}"
        )));
    }
    check_num(num, range, what)
}
