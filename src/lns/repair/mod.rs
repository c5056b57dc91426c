use enum_map::{enum_map, Enum, EnumMap};
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

mod chain_ordering;
mod scored_ordering;

use crate::problem::instance::{Instance, ProblemVariant};
use crate::problem::CustomerId;
use crate::utils::weighted_index;

/// The palette of reinsertion orderings. One entry is drawn per call from
/// the configured weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum)]
pub enum OrderStrategy {
    Shuffle,
    TimeWindowWidth,
    TimeWindowStart,
    TimeWindowEnd,
    Demand,
    Far,
    Close,
    PrizeDensity,
    Composite,
    NearestNeighborChain,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeights {
    pub shuffle: u32,
    pub time_window_width: u32,
    pub time_window_start: u32,
    pub time_window_end: u32,
    pub demand: u32,
    pub far: u32,
    pub close: u32,
    pub prize_density: u32,
    pub composite: u32,
    pub nearest_neighbor_chain: u32,
}

impl StrategyWeights {
    pub fn default_for_variant(variant: ProblemVariant) -> Self {
        match variant {
            ProblemVariant::Capacitated => Self {
                shuffle: 2,
                time_window_width: 0,
                time_window_start: 0,
                time_window_end: 0,
                demand: 4,
                far: 2,
                close: 3,
                prize_density: 0,
                composite: 2,
                nearest_neighbor_chain: 3,
            },
            ProblemVariant::PrizeCollecting => Self {
                shuffle: 2,
                time_window_width: 0,
                time_window_start: 0,
                time_window_end: 0,
                demand: 3,
                far: 1,
                close: 2,
                prize_density: 4,
                composite: 2,
                nearest_neighbor_chain: 2,
            },
            ProblemVariant::TimeWindowed => Self {
                shuffle: 2,
                time_window_width: 4,
                time_window_start: 2,
                time_window_end: 2,
                demand: 3,
                far: 1,
                close: 2,
                prize_density: 0,
                composite: 2,
                nearest_neighbor_chain: 2,
            },
        }
    }

    fn to_enum_map(&self) -> EnumMap<OrderStrategy, u32> {
        enum_map! {
            OrderStrategy::Shuffle => self.shuffle,
            OrderStrategy::TimeWindowWidth => self.time_window_width,
            OrderStrategy::TimeWindowStart => self.time_window_start,
            OrderStrategy::TimeWindowEnd => self.time_window_end,
            OrderStrategy::Demand => self.demand,
            OrderStrategy::Far => self.far,
            OrderStrategy::Close => self.close,
            OrderStrategy::PrizeDensity => self.prize_density,
            OrderStrategy::Composite => self.composite,
            OrderStrategy::NearestNeighborChain => self.nearest_neighbor_chain,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderingParameters {
    pub weights: StrategyWeights,
    /// Relative magnitude of the tie-breaking jitter on scores; 0 disables
    /// it.
    pub jitter_factor: f64,
    /// Chance to reverse the whole order after the primary sort.
    pub reverse_probability: f64,
    /// Upper bound on the random index swaps applied after sorting.
    pub max_random_swaps: usize,
    /// Chance per chain link to pick from the closest candidates instead of
    /// strictly greedily.
    pub chain_noise_probability: f64,
}

impl OrderingParameters {
    pub fn default_for_variant(variant: ProblemVariant) -> Self {
        Self {
            weights: StrategyWeights::default_for_variant(variant),
            jitter_factor: 1e-4,
            reverse_probability: 0.25,
            max_random_swaps: 2,
            chain_noise_probability: 0.1,
        }
    }
}

/// Repair-ordering operator: permutes the removed customers into the
/// sequence in which the external greedy insertion re-offers them. A pure
/// permutation in every case.
pub struct ReinsertionOrder<'a> {
    instance: &'a Instance,
    params: OrderingParameters,
    weights: EnumMap<OrderStrategy, u32>,
}

impl<'a> ReinsertionOrder<'a> {
    pub fn with_instance(instance: &'a Instance) -> Self {
        Self::new(
            instance,
            OrderingParameters::default_for_variant(instance.variant()),
        )
    }

    pub fn new(instance: &'a Instance, mut params: OrderingParameters) -> Self {
        params.jitter_factor = params.jitter_factor.max(0.0);
        params.reverse_probability = params.reverse_probability.clamp(0.0, 1.0);
        params.chain_noise_probability = params.chain_noise_probability.clamp(0.0, 1.0);
        let weights = params.weights.to_enum_map();
        Self {
            instance,
            params,
            weights,
        }
    }

    pub fn order<R: Rng>(&self, customers: &mut Vec<CustomerId>, rng: &mut R) {
        if customers.len() <= 1 {
            return;
        }
        let strategy = self.draw_strategy(rng);
        trace!("ordering {} customers via {:?}", customers.len(), strategy);
        self.order_with_strategy(strategy, customers, rng);
    }

    pub fn order_with_strategy<R: Rng>(
        &self,
        strategy: OrderStrategy,
        customers: &mut Vec<CustomerId>,
        rng: &mut R,
    ) {
        if customers.len() <= 1 {
            return;
        }
        match strategy {
            OrderStrategy::Shuffle => customers.shuffle(rng),
            OrderStrategy::NearestNeighborChain => {
                chain_ordering::order_by_chain(
                    self.instance,
                    self.params.chain_noise_probability,
                    customers,
                    rng,
                );
                self.perturb(customers, rng);
            }
            _ => {
                scored_ordering::order_by_score(
                    self.instance,
                    &self.params,
                    strategy,
                    customers,
                    rng,
                );
                self.perturb(customers, rng);
            }
        }
    }

    fn draw_strategy<R: Rng>(&self, rng: &mut R) -> OrderStrategy {
        let weights: Vec<u32> = self.weights.iter().map(|(_, w)| *w).collect();
        let at = weighted_index(rng, &weights);
        self.weights
            .iter()
            .map(|(strategy, _)| strategy)
            .nth(at)
            .unwrap_or(OrderStrategy::Shuffle)
    }

    /// Bounded random swaps as a final small perturbation.
    fn perturb<R: Rng>(&self, customers: &mut [CustomerId], rng: &mut R) {
        if customers.len() < 2 || self.params.max_random_swaps == 0 {
            return;
        }
        let swaps = rng.gen_range(0..=self.params.max_random_swaps);
        for _ in 0..swaps {
            let i = rng.gen_range(0..customers.len());
            let j = rng.gen_range(0..customers.len());
            customers.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::distance_matrix::DistanceMatrix;
    use crate::problem::instance::{
        create_instance_with, instance_from_coords, plain_node, Node,
    };
    use crate::problem::Num;
    use crate::utils::{assert_vec_eq, create_seeded_rng};

    fn ids(raw: &[usize]) -> Vec<CustomerId> {
        raw.iter().map(|&id| CustomerId::new(id)).collect()
    }

    fn is_permutation(before: &[CustomerId], after: &[CustomerId]) -> bool {
        let mut a = before.to_vec();
        let mut b = after.to_vec();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }

    fn line_instance(variant: ProblemVariant, n: usize) -> Instance {
        let coords: Vec<(f64, f64)> = (0..=n).map(|i| (i as f64, 0.0)).collect();
        instance_from_coords(variant, 100, &coords)
    }

    /// Four customers whose time-window widths are 5, 1, 9 and 3.
    fn tw_instance() -> Instance {
        let coords = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)];
        let widths = [5, 1, 9, 3];
        let nodes: Vec<Node> = coords
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| {
                let mut node = plain_node(id, x, y, if id == 0 { 0 } else { 1 });
                if id > 0 {
                    node.ready = Num::from(10);
                    node.due = Num::from(10 + widths[id - 1]);
                }
                node
            })
            .collect();
        create_instance_with(
            "tw".to_string(),
            ProblemVariant::TimeWindowed,
            100,
            nodes,
            DistanceMatrix::with_euclidean_distances(&coords),
        )
        .unwrap()
    }

    fn exact_params(variant: ProblemVariant) -> OrderingParameters {
        OrderingParameters {
            jitter_factor: 0.0,
            reverse_probability: 0.0,
            max_random_swaps: 0,
            chain_noise_probability: 0.0,
            ..OrderingParameters::default_for_variant(variant)
        }
    }

    #[test]
    fn every_strategy_is_a_pure_permutation() {
        let _ = env_logger::builder().is_test(true).try_init();
        let instance = line_instance(ProblemVariant::TimeWindowed, 12);
        let order = ReinsertionOrder::with_instance(&instance);
        let mut rng = create_seeded_rng(41);

        for strategy in [
            OrderStrategy::Shuffle,
            OrderStrategy::TimeWindowWidth,
            OrderStrategy::TimeWindowStart,
            OrderStrategy::TimeWindowEnd,
            OrderStrategy::Demand,
            OrderStrategy::Far,
            OrderStrategy::Close,
            OrderStrategy::PrizeDensity,
            OrderStrategy::Composite,
            OrderStrategy::NearestNeighborChain,
        ] {
            for _ in 0..10 {
                let before = ids(&[3, 1, 7, 12, 5, 9]);
                let mut after = before.clone();
                order.order_with_strategy(strategy, &mut after, &mut rng);
                assert!(
                    is_permutation(&before, &after),
                    "{:?} is not a permutation: {:?}",
                    strategy,
                    after
                );
            }
        }
    }

    #[test]
    fn weighted_entry_point_is_a_pure_permutation_for_all_variants() {
        for variant in [
            ProblemVariant::Capacitated,
            ProblemVariant::PrizeCollecting,
            ProblemVariant::TimeWindowed,
        ] {
            let instance = line_instance(variant, 10);
            let order = ReinsertionOrder::with_instance(&instance);
            let mut rng = create_seeded_rng(42);
            for _ in 0..50 {
                let before = ids(&[2, 4, 6, 8, 10, 1]);
                let mut after = before.clone();
                order.order(&mut after, &mut rng);
                assert!(is_permutation(&before, &after));
            }
        }
    }

    #[test]
    fn degenerate_inputs_are_no_ops() {
        let instance = line_instance(ProblemVariant::Capacitated, 5);
        let order = ReinsertionOrder::with_instance(&instance);
        let mut rng = create_seeded_rng(43);

        let mut empty: Vec<CustomerId> = Vec::new();
        order.order(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut single = ids(&[3]);
        order.order(&mut single, &mut rng);
        assert_vec_eq(&ids(&[3]), &single);
    }

    #[test]
    fn tightness_ascending_matches_expected_order() {
        let instance = tw_instance();
        let order = ReinsertionOrder::new(&instance, exact_params(ProblemVariant::TimeWindowed));
        let mut rng = create_seeded_rng(44);

        let mut customers = ids(&[1, 2, 3, 4]);
        order.order_with_strategy(OrderStrategy::TimeWindowWidth, &mut customers, &mut rng);
        assert_vec_eq(&ids(&[2, 4, 1, 3]), &customers);
    }

    #[test]
    fn demand_orders_descending_with_id_tie_break() {
        let coords = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)];
        let demands = [7, 2, 7, 9];
        let nodes: Vec<Node> = coords
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| {
                plain_node(id, x, y, if id == 0 { 0 } else { demands[id - 1] })
            })
            .collect();
        let instance = create_instance_with(
            "demand".to_string(),
            ProblemVariant::Capacitated,
            100,
            nodes,
            DistanceMatrix::with_euclidean_distances(&coords),
        )
        .unwrap();
        let order = ReinsertionOrder::new(&instance, exact_params(ProblemVariant::Capacitated));
        let mut rng = create_seeded_rng(45);

        let mut customers = ids(&[1, 2, 3, 4]);
        order.order_with_strategy(OrderStrategy::Demand, &mut customers, &mut rng);
        assert_vec_eq(&ids(&[4, 1, 3, 2]), &customers);
    }

    #[test]
    fn reverse_probability_one_flips_the_sorted_order() {
        let instance = line_instance(ProblemVariant::Capacitated, 8);
        let forward = ReinsertionOrder::new(&instance, exact_params(ProblemVariant::Capacitated));
        let backward = ReinsertionOrder::new(
            &instance,
            OrderingParameters {
                reverse_probability: 1.0,
                ..exact_params(ProblemVariant::Capacitated)
            },
        );
        let mut rng_a = create_seeded_rng(46);
        let mut rng_b = create_seeded_rng(46);

        let mut close = ids(&[5, 2, 8, 1]);
        forward.order_with_strategy(OrderStrategy::Close, &mut close, &mut rng_a);
        let mut far = ids(&[5, 2, 8, 1]);
        backward.order_with_strategy(OrderStrategy::Close, &mut far, &mut rng_b);

        let reversed: Vec<CustomerId> = close.iter().rev().copied().collect();
        assert_vec_eq(&reversed, &far);
    }

    #[test]
    fn all_equal_scores_fall_back_to_a_shuffle() {
        // every prize is zero, so the density scores are all identical
        let instance = line_instance(ProblemVariant::PrizeCollecting, 9);
        let order = ReinsertionOrder::new(&instance, exact_params(ProblemVariant::PrizeCollecting));
        let mut rng = create_seeded_rng(47);

        let before = ids(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let mut differs = false;
        for _ in 0..20 {
            let mut after = before.clone();
            order.order_with_strategy(OrderStrategy::PrizeDensity, &mut after, &mut rng);
            assert!(is_permutation(&before, &after));
            differs |= after != before;
        }
        assert!(differs, "degenerate scores never produced a new order");
    }

    #[test]
    fn chain_with_zero_noise_is_greedy() {
        let instance = line_instance(ProblemVariant::Capacitated, 10);
        let order = ReinsertionOrder::new(&instance, exact_params(ProblemVariant::Capacitated));
        let mut rng = create_seeded_rng(48);

        for _ in 0..20 {
            let mut customers = ids(&[1, 3, 5, 7, 9, 10]);
            order.order_with_strategy(
                OrderStrategy::NearestNeighborChain,
                &mut customers,
                &mut rng,
            );
            // each link goes to the nearest customer still unplaced
            for i in 0..customers.len() - 1 {
                let next = instance.distance_between(customers[i], customers[i + 1]);
                for later in &customers[i + 2..] {
                    assert!(
                        next <= instance.distance_between(customers[i], *later),
                        "chain link {} -> {} is not greedy",
                        customers[i],
                        customers[i + 1]
                    );
                }
            }
        }
    }

    #[test]
    fn identical_seeds_produce_identical_orders() {
        let instance = line_instance(ProblemVariant::TimeWindowed, 15);
        let order = ReinsertionOrder::with_instance(&instance);
        let mut rng_a = create_seeded_rng(321);
        let mut rng_b = create_seeded_rng(321);

        for _ in 0..30 {
            let mut a = ids(&[14, 3, 9, 1, 12, 6, 7]);
            let mut b = a.clone();
            order.order(&mut a, &mut rng_a);
            order.order(&mut b, &mut rng_b);
            assert_vec_eq(&a, &b);
        }
    }
}
