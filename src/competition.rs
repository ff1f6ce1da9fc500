//! Competition for food within one epoch.

use crate::altruism::{AltruismPolicy, resolve_pair};
use crate::config::{ModelConfig, RewardConfig};
use crate::error::SimError;
use crate::field::{FoodField, RandomField};
use crate::model::Organism;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// How organisms obtain meals during an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionPolicy {
    /// Organisms move toward the nearest food and eat it once within range.
    Pursuit,
    /// Organisms claim random food particles without moving.
    #[serde(rename = "lottery")]
    LotteryAssignment,
}

/// Summary of one epoch's competition phase.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CompetitionReport {
    /// Movement steps taken (always 0 for the lottery policy).
    pub steps: usize,
    /// Food particles eaten, or claimed, during the epoch.
    pub food_taken: usize,
    /// Index pairs of organisms that claimed the same particle.
    pub pairs: Vec<(usize, usize)>,
}

/// Advance every still-seeking organism by one pursuit step.
///
/// `active` is the snapshot of seeking organisms at the start of the step.
/// Returns the organisms still seeking afterwards: those that reach the meal
/// cap, run out of food to chase or can no longer move drop out.
pub fn pursuit_step(
    active: &[usize],
    organisms: &mut [Organism],
    food: &mut FoodField,
    model: &ModelConfig,
) -> Result<Vec<usize>, SimError> {
    let meal_cap = f64::from(model.meal_cap);
    let mut still_active = Vec::with_capacity(active.len());

    for &i_org in active {
        let org = &mut organisms[i_org];
        if food.is_empty() || org.meals >= meal_cap {
            continue;
        }

        let i_food = org.find_nearest_food(food.particles())?;
        let target = food.particles()[i_food].position;

        if org.position.distance(&target) < model.feeding_range {
            food.consume(i_food);
            org.meals += 1.0;
            if org.meals < meal_cap {
                still_active.push(i_org);
            }
        } else if org.can_move(model.energy_limited) {
            org.move_toward(target, model.effortless_movement, model.energy_limited);
            still_active.push(i_org);
        }
    }

    Ok(still_active)
}

/// Run the pursuit policy until no organism is seeking or the step cap is hit.
///
/// `on_step` is called after every step with the step number.
pub fn run_pursuit<F>(
    organisms: &mut [Organism],
    food: &mut FoodField,
    model: &ModelConfig,
    max_steps: usize,
    mut on_step: F,
) -> Result<CompetitionReport>
where
    F: FnMut(usize, &[Organism], &FoodField) -> Result<()>,
{
    let food_before = food.len();
    let mut active: Vec<usize> = (0..organisms.len()).collect();
    let mut steps = 0;

    while !active.is_empty() && steps < max_steps {
        active = pursuit_step(&active, organisms, food, model)
            .with_context(|| format!("failed to perform pursuit step {steps}"))?;
        steps += 1;
        on_step(steps, organisms, food).context("failed to handle step")?;
    }
    log::debug!("pursuit ended after {steps} steps with {} seeking", active.len());

    Ok(CompetitionReport {
        steps,
        food_taken: food_before - food.len(),
        pairs: Vec::new(),
    })
}

/// Run the lottery-assignment policy.
///
/// In random order each organism claims a random particle claimed by at most
/// one organism before it. Uncontested claims earn one meal; contested ones
/// are resolved by [`resolve_pair`].
pub fn run_lottery(
    organisms: &mut [Organism],
    food: &FoodField,
    policy: AltruismPolicy,
    rewards: &RewardConfig,
    field: &mut RandomField,
) -> CompetitionReport {
    let mut order: Vec<usize> = (0..organisms.len()).collect();
    field.shuffle(&mut order);

    let mut claims: Vec<Vec<usize>> = vec![Vec::with_capacity(2); food.len()];
    let mut available: Vec<usize> = (0..food.len()).collect();

    for i_org in order {
        if available.is_empty() {
            break;
        }
        let i_avail = field.index(available.len());
        let i_food = available[i_avail];
        claims[i_food].push(i_org);
        if claims[i_food].len() >= 2 {
            available.swap_remove(i_avail);
        }
    }

    let mut report = CompetitionReport::default();
    for claim in &claims {
        match claim.as_slice() {
            [] => {}
            [i_org] => {
                organisms[*i_org].meals += 1.0;
                report.food_taken += 1;
            }
            [i_a, i_b, ..] => {
                let (reward_a, reward_b) = resolve_pair(
                    policy,
                    organisms[*i_a].traits.altruistic,
                    organisms[*i_b].traits.altruistic,
                    rewards,
                );
                organisms[*i_a].meals += reward_a;
                organisms[*i_b].meals += reward_b;
                report.food_taken += 1;
                report.pairs.push((*i_a, *i_b));
                log::debug!(
                    "organisms {} and {} contested a particle: {reward_a} / {reward_b}",
                    organisms[*i_a].id(),
                    organisms[*i_b].id()
                );
            }
        }
    }
    report
}
