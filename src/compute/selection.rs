//! Fitness-proportional mating pool selection.

use log::debug;

use super::candidate::SearchRng;
use super::fitness::{FitnessDistribution, FitnessError};

/// Draw `pool_size` parents independently and with replacement.
///
/// Index `i` is chosen with probability `fitness.weights()[i]`, so the pool
/// is a multiset in which fitter members tend to appear more often.
pub fn make_mating_pool<'p, C>(
    population: &'p [C],
    fitness: &FitnessDistribution,
    pool_size: usize,
    rng: &mut SearchRng,
) -> Result<Vec<&'p C>, FitnessError> {
    if population.len() != fitness.len() {
        return Err(FitnessError::LengthMismatch {
            population: population.len(),
            weights: fitness.len(),
        });
    }

    let pool: Vec<&C> = (0..pool_size)
        .map(|_| &population[fitness.sample_index(rng)])
        .collect();

    debug!(
        "Mating pool: {} draws from {} members ({} ineligible)",
        pool.len(),
        population.len(),
        fitness.excluded()
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Score;
    use proptest::prelude::*;

    #[test]
    fn test_pool_size_and_membership() {
        let population: Vec<String> = ["a", "b", "c"].map(String::from).to_vec();
        let fitness =
            FitnessDistribution::from_scores(&[Score::new(3.0), Score::new(2.0), Score::new(1.0)])
                .unwrap();
        let mut rng = SearchRng::new(11);

        let pool = make_mating_pool(&population, &fitness, 50, &mut rng).unwrap();
        assert_eq!(pool.len(), 50);
        assert!(pool.iter().all(|p| population.contains(*p)));
    }

    #[test]
    fn test_zero_weight_never_drawn() {
        let population: Vec<String> = ["keep", "drop"].map(String::from).to_vec();
        let fitness =
            FitnessDistribution::from_scores(&[Score::new(1.0), Score::Invalid]).unwrap();
        let mut rng = SearchRng::new(5);

        let pool = make_mating_pool(&population, &fitness, 200, &mut rng).unwrap();
        assert!(pool.iter().all(|p| p.as_str() == "keep"));
    }

    #[test]
    fn test_length_mismatch() {
        let population: Vec<String> = vec!["a".to_string()];
        let fitness =
            FitnessDistribution::from_scores(&[Score::new(1.0), Score::new(1.0)]).unwrap();
        let mut rng = SearchRng::new(0);
        assert!(matches!(
            make_mating_pool(&population, &fitness, 4, &mut rng),
            Err(FitnessError::LengthMismatch { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_pool_draws_exactly_m(
            values in prop::collection::vec(0.1f64..100.0, 1..20),
            pool_size in 0usize..64,
            seed in any::<u64>(),
        ) {
            let population: Vec<usize> = (0..values.len()).collect();
            let scores: Vec<Score> = values.iter().copied().map(Score::new).collect();
            let fitness = FitnessDistribution::from_scores(&scores).unwrap();
            let mut rng = SearchRng::new(seed);

            let pool = make_mating_pool(&population, &fitness, pool_size, &mut rng).unwrap();
            prop_assert_eq!(pool.len(), pool_size);
            prop_assert!(pool.iter().all(|p| **p < values.len()));
        }
    }
}
