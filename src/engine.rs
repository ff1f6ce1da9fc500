use crate::altruism::{self, AltruismPolicy};
use crate::competition::{self, CompetitionPolicy, CompetitionReport};
use crate::config::Config;
use crate::field::{FoodField, RandomField};
use crate::fitness;
use crate::metrics::{EpochEvents, MetricsCollector, MetricsTable};
use crate::model::{Food, Organism, Traits};
use anyhow::{Context, Result};
use std::mem;

/// Draws frames of the arena.
pub trait Renderer {
    fn draw(&mut self, organisms: &[Organism], food: &[Food], step: usize, epoch: usize)
    -> Result<()>;
}

/// Receives the metrics table of a finished run.
pub trait MetricsSink {
    fn write(&mut self, run_idx: usize, metrics: &MetricsTable) -> Result<()>;
}

/// Records the configuration a run was started with.
pub trait ConfigStore {
    fn persist(&mut self, cfg: &Config, run_name: &str) -> Result<()>;
}

/// External collaborators of a run.
pub struct Outputs<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub metrics_sink: &'a mut dyn MetricsSink,
    pub config_store: &'a mut dyn ConfigStore,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The epoch cap was reached with organisms still alive.
    EpochCapReached { epochs: usize, population: usize },
    /// Every organism died during `epoch`.
    ZeroPopulation { epoch: usize },
}

/// Simulation engine.
///
/// Owns the configuration, the population, the food field and the random
/// stream of one run, and drives it epoch by epoch.
pub struct Engine {
    cfg: Config,
    organisms: Vec<Organism>,
    food: FoodField,
    field: RandomField,
    next_id: u64,
    epoch: usize,
}

impl Engine {
    /// Create a new `Engine` with a random initial population.
    ///
    /// The random stream is seeded from `cfg.run.seed` offset by `run_idx`,
    /// or from the OS when no seed is configured.
    pub fn generate_initial_condition(cfg: Config, run_idx: usize) -> Result<Self> {
        let field = match cfg.run.seed {
            Some(seed) => RandomField::from_seed(
                seed.wrapping_add(run_idx as u64),
                cfg.arena.size_x,
                cfg.arena.size_y,
            ),
            None => RandomField::from_os_rng(cfg.arena.size_x, cfg.arena.size_y)
                .context("failed to seed random field")?,
        };
        Ok(Self::with_field(cfg, field))
    }

    /// Create a new `Engine` drawing from the given random field.
    pub fn with_field(cfg: Config, mut field: RandomField) -> Self {
        let n_org = cfg.init.pop_size;
        let n_alt = (n_org as f64 * cfg.init.altruistic_fraction).round() as usize;

        let organisms = (0..n_org)
            .map(|i_org| {
                let traits = Traits {
                    longevity: cfg.init.longevity,
                    altruistic: i_org < n_alt,
                    altruism: cfg.init.altruism,
                    velocity: cfg.init.velocity,
                    energy: cfg.init.energy,
                    energy_release_rate: cfg.init.energy_release_rate,
                };
                Organism::new(i_org as u64, traits, field.position())
            })
            .collect();

        Self {
            cfg,
            organisms,
            food: FoodField::default(),
            field,
            next_id: n_org as u64,
            epoch: 0,
        }
    }

    pub fn organisms(&self) -> &[Organism] {
        &self.organisms
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Perform a full run and hand its results to the external collaborators.
    pub fn run(&mut self, run_idx: usize, run_name: &str, outputs: Outputs) -> Result<Outcome> {
        outputs
            .config_store
            .persist(&self.cfg, run_name)
            .context("failed to persist config")?;

        let mut collector = MetricsCollector::new();
        collector.record(self.epoch, &self.organisms, EpochEvents::default());

        let outcome = loop {
            if self.epoch >= self.cfg.run.max_epochs {
                break Outcome::EpochCapReached {
                    epochs: self.epoch,
                    population: self.organisms.len(),
                };
            }

            let events = self
                .perform_epoch(outputs.renderer)
                .with_context(|| format!("failed to perform epoch {}", self.epoch + 1))?;
            collector.record(self.epoch, &self.organisms, events);

            log::info!(
                "epoch {:5}: population {:6} (+{} -{})",
                self.epoch,
                self.organisms.len(),
                events.births,
                events.starvation_deaths + events.old_age_deaths
            );

            if self.organisms.is_empty() {
                break Outcome::ZeroPopulation { epoch: self.epoch };
            }
        };
        log::info!("{run_name} finished: {outcome:?}");

        outputs
            .metrics_sink
            .write(run_idx, collector.table())
            .context("failed to write metrics")?;

        Ok(outcome)
    }

    /// Perform one epoch: food generation, competition, altruism and fitness.
    pub fn perform_epoch(&mut self, renderer: &mut dyn Renderer) -> Result<EpochEvents> {
        self.epoch += 1;
        let epoch = self.epoch;

        // Regenerate food from the initial or the current population size.
        let pop_size = if self.cfg.food.static_generation {
            self.cfg.init.pop_size
        } else {
            self.organisms.len()
        };
        let n_food = FoodField::count_for(pop_size, self.cfg.food.abundance);
        self.food.generate(n_food, &mut self.field);

        let report = self
            .compete(renderer, epoch)
            .context("failed to resolve competition")?;

        let transfers = match self.cfg.model.altruism {
            AltruismPolicy::Sharing => altruism::share_surplus(&mut self.organisms, &mut self.field),
            AltruismPolicy::None | AltruismPolicy::ConflictResolution => 0,
        };

        let population = mem::take(&mut self.organisms);
        let (next, fitness) =
            fitness::evaluate(population, &self.cfg.model, &mut self.field, &mut self.next_id)
                .context("failed to evaluate fitness")?;
        self.organisms = next;

        Ok(EpochEvents {
            births: fitness.births,
            starvation_deaths: fitness.starvation_deaths,
            old_age_deaths: fitness.old_age_deaths,
            transfers,
            competing_pairs: report.pairs.len(),
        })
    }

    fn compete(&mut self, renderer: &mut dyn Renderer, epoch: usize) -> Result<CompetitionReport> {
        let report = match self.cfg.model.competition {
            CompetitionPolicy::Pursuit => {
                let render_every = self.cfg.run.render_every;
                competition::run_pursuit(
                    &mut self.organisms,
                    &mut self.food,
                    &self.cfg.model,
                    self.cfg.run.max_steps_per_epoch,
                    |step, organisms, food| {
                        if step % render_every == 0 {
                            renderer.draw(organisms, food.particles(), step, epoch)?;
                        }
                        Ok(())
                    },
                )?
            }
            CompetitionPolicy::LotteryAssignment => {
                let report = competition::run_lottery(
                    &mut self.organisms,
                    &self.food,
                    self.cfg.model.altruism,
                    &self.cfg.rewards,
                    &mut self.field,
                );
                renderer.draw(&self.organisms, self.food.particles(), 0, epoch)?;
                report
            }
        };
        log::debug!(
            "epoch {epoch}: {} food taken, {} left, {} steps, {} competing pairs",
            report.food_taken,
            self.food.len(),
            report.steps,
            report.pairs.len()
        );
        Ok(report)
    }
}
