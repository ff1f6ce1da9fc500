//! Survival, reproduction and death at the end of an epoch.

use crate::config::ModelConfig;
use crate::field::RandomField;
use crate::model::Organism;
use anyhow::Result;
use rand_distr::{Bernoulli, Uniform};

/// Outcome of the fitness pass over one population.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FitnessReport {
    pub births: usize,
    pub starvation_deaths: usize,
    pub old_age_deaths: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fate {
    Starved,
    Aged,
    Survived,
}

/// Apply the fitness rule to every organism and build the next generation.
///
/// Each organism ages by one epoch. It then starves if it ate nothing (when
/// starvation is enabled), otherwise it may reproduce with a chance of
/// `meals * reproduction_factor` percent and dies of old age once its age
/// reaches its longevity. Survivors are reset for the next epoch and the
/// clones are appended after them.
pub fn evaluate(
    population: Vec<Organism>,
    model: &ModelConfig,
    field: &mut RandomField,
    next_id: &mut u64,
) -> Result<(Vec<Organism>, FitnessReport)> {
    let dists = Dists {
        percent: Uniform::new_inclusive(0, 100)?,
        mutation: Bernoulli::new(model.mutation_chance / 100.0)?,
    };
    let mut report = FitnessReport::default();
    let mut survivors = Vec::with_capacity(population.len());
    let mut clones = Vec::new();

    for mut org in population {
        org.age += 1;
        match judge(&org, model, &dists, field, next_id, &mut clones) {
            Fate::Starved => report.starvation_deaths += 1,
            Fate::Aged => report.old_age_deaths += 1,
            Fate::Survived => {
                org.reset_for_next_epoch();
                survivors.push(org);
            }
        }
    }

    report.births = clones.len();
    survivors.append(&mut clones);
    Ok((survivors, report))
}

struct Dists {
    percent: Uniform<u32>,
    mutation: Bernoulli,
}

fn judge(
    org: &Organism,
    model: &ModelConfig,
    dists: &Dists,
    field: &mut RandomField,
    next_id: &mut u64,
    clones: &mut Vec<Organism>,
) -> Fate {
    if org.meals <= 0.0 && model.starvation {
        return Fate::Starved;
    }

    let rep_chance = org.meals * model.reproduction_factor;
    if f64::from(field.sample(&dists.percent)) <= rep_chance {
        let mut clone = org.offspring(*next_id, field.position());
        *next_id += 1;
        if field.sample(&dists.mutation) {
            clone.mutate(field, model.mutability);
        }
        clones.push(clone);
    }

    if org.age >= org.traits.longevity {
        Fate::Aged
    } else {
        Fate::Survived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::pursuit_config;
    use crate::model::tests::organism_at;

    fn certain_model() -> ModelConfig {
        let mut model = pursuit_config().model;
        model.reproduction_factor = 100.0;
        model.mutation_chance = 0.0;
        model
    }

    #[test]
    fn starving_organisms_die_before_reproducing() {
        let model = certain_model();
        let mut field = RandomField::from_seed(1, 10.0, 10.0);
        let mut next_id = 10;
        let population = vec![organism_at(0, 0.0, 0.0)];

        let (next, report) =
            evaluate(population, &model, &mut field, &mut next_id).expect("valid model");

        assert!(next.is_empty());
        assert_eq!(report.starvation_deaths, 1);
        assert_eq!(report.births, 0);
        assert_eq!(next_id, 10);
    }

    #[test]
    fn fed_organisms_reproduce_with_certainty() {
        let model = certain_model();
        let mut field = RandomField::from_seed(2, 10.0, 10.0);
        let mut next_id = 10;
        let mut population: Vec<_> = (0..5).map(|id| organism_at(id, 1.0, 1.0)).collect();
        population.iter_mut().for_each(|org| org.meals = 1.0);

        let (next, report) =
            evaluate(population, &model, &mut field, &mut next_id).expect("valid model");

        assert_eq!(report.births, 5);
        assert_eq!(next.len(), 10);
        assert_eq!(next_id, 15);
        let clones = &next[5..];
        assert!(clones.iter().all(|org| org.age == 0 && org.meals == 0.0));
        assert!(clones.iter().all(|org| org.id() >= 10));
        let parents = &next[..5];
        assert!(parents.iter().all(|org| org.age == 1 && org.meals == 0.0));
    }

    #[test]
    fn old_organisms_reproduce_then_die() {
        let model = certain_model();
        let mut field = RandomField::from_seed(3, 10.0, 10.0);
        let mut next_id = 1;
        let mut org = organism_at(0, 0.0, 0.0);
        org.age = 1;
        org.meals = 2.0;

        let (next, report) =
            evaluate(vec![org], &model, &mut field, &mut next_id).expect("valid model");

        assert_eq!(report.old_age_deaths, 1);
        assert_eq!(report.births, 1);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id(), 1);
        assert!(next.iter().all(|org| org.age < org.traits.longevity));
    }

    #[test]
    fn hungry_organisms_survive_without_starvation() {
        let mut model = certain_model();
        model.starvation = false;
        model.reproduction_factor = 0.0;
        let mut field = RandomField::from_seed(4, 10.0, 10.0);
        let mut next_id = 1;

        let (next, report) = evaluate(
            vec![organism_at(0, 0.0, 0.0)],
            &model,
            &mut field,
            &mut next_id,
        )
        .expect("valid model");

        assert_eq!(report.starvation_deaths, 0);
        assert_eq!(next.len() - report.births, 1);
    }

    #[test]
    fn survivors_return_to_start_position() {
        let model = certain_model();
        let mut field = RandomField::from_seed(5, 10.0, 10.0);
        let mut next_id = 1;
        let mut org = organism_at(0, 2.0, 3.0);
        org.position.x = 7.0;
        org.meals = 1.0;

        let (next, _) =
            evaluate(vec![org], &model, &mut field, &mut next_id).expect("valid model");

        assert_eq!(next[0].id(), 0);
        assert_eq!(next[0].position, next[0].start_position);
        assert_eq!(next[0].position.x, 2.0);
    }
}
