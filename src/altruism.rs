//! Altruistic behavior: meal sharing and competing-pair resolution.

use crate::config::RewardConfig;
use crate::field::RandomField;
use crate::model::Organism;
use serde::{Deserialize, Serialize};

/// How altruistic organisms behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltruismPolicy {
    /// No altruistic behavior; contested food is fought over.
    None,
    /// Surplus meals are given to needy altruistic organisms after competition.
    Sharing,
    /// Contested food is resolved according to both contestants' altruism.
    #[serde(rename = "conflict")]
    ConflictResolution,
}

/// Give one meal from each surplus altruistic organism to a random needy one.
///
/// Donors have at least two meals and recipients none. Each donor gives at
/// most once and each recipient receives at most once. Returns the number of
/// transfers.
pub fn share_surplus(organisms: &mut [Organism], field: &mut RandomField) -> usize {
    let donors: Vec<usize> = organisms
        .iter()
        .enumerate()
        .filter(|(_, org)| org.traits.altruistic && org.meals >= 2.0)
        .map(|(i_org, _)| i_org)
        .collect();
    let mut needy: Vec<usize> = organisms
        .iter()
        .enumerate()
        .filter(|(_, org)| org.traits.altruistic && org.meals <= 0.0)
        .map(|(i_org, _)| i_org)
        .collect();

    let mut n_transfers = 0;
    for i_donor in donors {
        if needy.is_empty() {
            break;
        }
        let i_recipient = needy.swap_remove(field.index(needy.len()));

        let (donor, recipient) = pair_mut(organisms, i_donor, i_recipient);
        donor.share(recipient);
        log::debug!("organism {} shared a meal with {}", donor.id(), recipient.id());
        n_transfers += 1;
    }
    n_transfers
}

/// Rewards for two organisms that claimed the same food particle.
pub fn resolve_pair(
    policy: AltruismPolicy,
    a_altruistic: bool,
    b_altruistic: bool,
    rewards: &RewardConfig,
) -> (f64, f64) {
    if policy != AltruismPolicy::ConflictResolution {
        return (rewards.conflict_cost, rewards.conflict_cost);
    }
    match (a_altruistic, b_altruistic) {
        (true, true) => (rewards.cooperative_share, rewards.cooperative_share),
        (false, false) => (rewards.conflict_cost, rewards.conflict_cost),
        (true, false) => (rewards.leftovers, rewards.selfish_take),
        (false, true) => (rewards.selfish_take, rewards.leftovers),
    }
}

fn pair_mut(organisms: &mut [Organism], i: usize, j: usize) -> (&mut Organism, &mut Organism) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = organisms.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = organisms.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}
