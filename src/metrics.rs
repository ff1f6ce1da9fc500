//! Per-epoch population statistics.

use crate::model::Organism;
use crate::stats::Accumulator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Population statistics recorded at the end of an epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub population_size: usize,
    pub average_velocity: f64,
    pub velocity_std_dev: f64,
    pub average_altruism: f64,
    /// Change in population size since the previous epoch.
    pub population_growth_rate: i64,

    pub altruistic_count: usize,
    pub selfish_count: usize,
    pub altruistic_fraction: f64,
    pub selfish_fraction: f64,
    pub altruistic_per_selfish: f64,
    pub selfish_per_altruistic: f64,

    pub births: usize,
    pub starvation_deaths: usize,
    pub old_age_deaths: usize,
    pub transfers: usize,
    pub competing_pairs: usize,
}

/// Events of one epoch that are not visible in the population itself.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct EpochEvents {
    pub births: usize,
    pub starvation_deaths: usize,
    pub old_age_deaths: usize,
    pub transfers: usize,
    pub competing_pairs: usize,
}

/// Metrics of a whole run, keyed by epoch.
pub type MetricsTable = BTreeMap<usize, EpochMetrics>;

/// Collects [`EpochMetrics`] as a run progresses.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    table: MetricsTable,
    prev_size: Option<usize>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, epoch: usize, organisms: &[Organism], events: EpochEvents) {
        let pop_size = organisms.len();
        let velocity: Accumulator = organisms.iter().map(|org| org.traits.velocity).collect();
        let altruism: Accumulator = organisms.iter().map(|org| org.traits.altruism).collect();
        let velocity = velocity.report();

        let altruistic_count = organisms
            .iter()
            .filter(|org| org.traits.altruistic)
            .count();
        let selfish_count = pop_size - altruistic_count;

        let growth = match self.prev_size {
            Some(prev_size) => pop_size as i64 - prev_size as i64,
            None => 0,
        };

        let metrics = EpochMetrics {
            population_size: pop_size,
            average_velocity: velocity.mean,
            velocity_std_dev: velocity.std_dev,
            average_altruism: altruism.report().mean,
            population_growth_rate: growth,
            altruistic_count,
            selfish_count,
            altruistic_fraction: ratio(altruistic_count, pop_size, 0.0),
            selfish_fraction: ratio(selfish_count, pop_size, 0.0),
            altruistic_per_selfish: ratio(altruistic_count, selfish_count, 0.0),
            selfish_per_altruistic: ratio(selfish_count, altruistic_count, 1.0),
            births: events.births,
            starvation_deaths: events.starvation_deaths,
            old_age_deaths: events.old_age_deaths,
            transfers: events.transfers,
            competing_pairs: events.competing_pairs,
        };

        self.table.insert(epoch, metrics);
        self.prev_size = Some(pop_size);
    }

    pub fn table(&self) -> &MetricsTable {
        &self.table
    }
}

fn ratio(num: usize, den: usize, if_zero: f64) -> f64 {
    if den == 0 {
        if_zero
    } else {
        num as f64 / den as f64
    }
}
