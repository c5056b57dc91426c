use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tinyvec::ArrayVec;

use crate::lns::destroy::RemovalSet;
use crate::problem::instance::Instance;
use crate::problem::CustomerId;
use crate::solution::Solution;
use crate::utils::weighted_index;

/// Upper bound on the candidates generated per pivot.
const MAX_CANDIDATE_BATCH: usize = 32;
/// Rejection-sampling attempts before reseeding falls back to a linear scan.
const MAX_RESEED_ATTEMPTS: usize = 100;
/// Pivots are biased toward this many of the most recently added members.
const RECENT_WINDOW: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterRemovalParameters {
    /// Weighted palette for picking the initial seed.
    pub seed_uniform_weight: u32,
    pub seed_routed_weight: u32,
    pub seed_unrouted_weight: u32,
    pub seed_segment_weight: u32,
    /// Longest contiguous tour segment taken when seeding from a segment.
    pub max_seed_segment_len: usize,
    /// Bounds of the nearest-neighbor count examined per pivot; the actual
    /// count is drawn per pivot.
    pub min_neighbors_per_pivot: usize,
    pub max_neighbors_per_pivot: usize,
    /// Chance to offer the pivot's tour mates before its spatial neighbors.
    pub tour_mate_probability: f64,
    /// Acceptance probability of the closest candidate.
    pub base_accept_probability: f64,
    /// Geometric decay of the acceptance probability per candidate rank.
    pub rank_decay: f64,
    /// Additive acceptance bonus for candidates on the pivot's tour.
    pub same_tour_bonus: f64,
    /// Chance to pick the pivot among the most recently added members.
    pub recent_pivot_bias: f64,
    /// Consecutive acceptance-free pivots tolerated before reseeding.
    pub stall_limit: usize,
    /// Hard cap on pivot expansions per call; reaching it triggers the
    /// uniform random fill.
    pub max_expansion_attempts: usize,
}

impl Default for ClusterRemovalParameters {
    fn default() -> Self {
        Self {
            seed_uniform_weight: 4,
            seed_routed_weight: 3,
            seed_unrouted_weight: 1,
            seed_segment_weight: 2,
            max_seed_segment_len: 4,
            min_neighbors_per_pivot: 3,
            max_neighbors_per_pivot: 12,
            tour_mate_probability: 0.45,
            base_accept_probability: 0.8,
            rank_decay: 0.85,
            same_tour_bonus: 0.1,
            recent_pivot_bias: 0.3,
            stall_limit: 12,
            max_expansion_attempts: 400,
        }
    }
}

#[derive(Clone, Copy)]
enum CandidateSource {
    TourMates,
    SpatialNeighbors,
}

/// Destroy operator growing one or more spatial clusters around randomly
/// seeded customers. Always returns exactly `min(num, |customers|)` distinct
/// ids (1 at least while customers exist), regardless of how expansion went.
pub struct ClusterRemoval<'a> {
    instance: &'a Instance,
    params: ClusterRemovalParameters,
}

impl<'a> ClusterRemoval<'a> {
    pub fn with_instance(instance: &'a Instance) -> Self {
        Self::new(instance, ClusterRemovalParameters::default())
    }

    pub fn new(instance: &'a Instance, params: ClusterRemovalParameters) -> Self {
        Self {
            instance,
            params: sanitized(params),
        }
    }

    pub fn select<R: Rng>(
        &self,
        solution: &Solution,
        rng: &mut R,
        num: usize,
    ) -> Vec<CustomerId> {
        let n = self.instance.num_customers();
        if n == 0 {
            return Vec::new();
        }
        let target = num.min(n).max(1);

        let mut selected = RemovalSet::with_capacity(n, target);
        self.seed(solution, rng, target, &mut selected);
        let mut frontier: Vec<CustomerId> = selected.list().to_vec();

        let mut stall = 0usize;
        let mut attempts = 0usize;
        while selected.len() < target && attempts < self.params.max_expansion_attempts {
            attempts += 1;

            if frontier.is_empty() || stall >= self.params.stall_limit {
                // expansion stalled; open a new cluster around a fresh seed
                if let Some(seed) = reseed_uniform(n, &selected, rng) {
                    selected.insert(seed);
                    frontier.push(seed);
                }
                stall = 0;
                continue;
            }

            let pivot_at = self.pick_pivot(&frontier, rng);
            let pivot = frontier[pivot_at];
            let batch = self.candidate_batch(solution, pivot, &selected, rng);
            if batch.is_empty() {
                // nothing unselected around this pivot anymore
                frontier.swap_remove(pivot_at);
                stall += 1;
                continue;
            }

            let mut accepted_any = false;
            for (rank, &candidate) in batch.iter().enumerate() {
                if selected.len() >= target {
                    break;
                }
                if self.accepts(solution, pivot, candidate, rank, rng)
                    && selected.insert(candidate)
                {
                    frontier.push(candidate);
                    accepted_any = true;
                }
            }
            if accepted_any {
                stall = 0;
            } else {
                stall += 1;
            }
        }

        if selected.len() < target {
            warn!(
                "cluster removal saturated after {} expansions, filling {} of {} slots uniformly",
                attempts,
                target - selected.len(),
                target
            );
            fill_uniform_random(n, target, &mut selected, rng);
        }

        debug!(
            "cluster removal selected {} customers in {} expansions",
            selected.len(),
            attempts
        );
        debug_assert_eq!(target, selected.len());
        selected.into_list()
    }

    fn seed<R: Rng>(
        &self,
        solution: &Solution,
        rng: &mut R,
        target: usize,
        selected: &mut RemovalSet,
    ) {
        let n = self.instance.num_customers();
        let p = &self.params;
        let weights = [
            p.seed_uniform_weight,
            p.seed_routed_weight,
            p.seed_unrouted_weight,
            p.seed_segment_weight,
        ];
        match weighted_index(rng, &weights) {
            0 => {
                selected.insert(uniform_customer(n, rng));
            }
            1 => match random_routed_customer(solution, rng) {
                Some(c) => {
                    selected.insert(c);
                }
                None => {
                    selected.insert(uniform_customer(n, rng));
                }
            },
            2 => {
                // bias toward the unserved, as in prize-collecting variants
                let mut seeded = false;
                for _ in 0..MAX_RESEED_ATTEMPTS {
                    let c = uniform_customer(n, rng);
                    if !solution.is_routed(c) {
                        selected.insert(c);
                        seeded = true;
                        break;
                    }
                }
                if !seeded {
                    selected.insert(uniform_customer(n, rng));
                }
            }
            _ => {
                if !self.seed_tour_segment(solution, rng, target, selected) {
                    selected.insert(uniform_customer(n, rng));
                }
            }
        }
    }

    fn seed_tour_segment<R: Rng>(
        &self,
        solution: &Solution,
        rng: &mut R,
        target: usize,
        selected: &mut RemovalSet,
    ) -> bool {
        let tours: Vec<usize> = (0..solution.tours().len())
            .filter(|&t| !solution.tour(t).is_empty())
            .collect();
        let t = match tours.as_slice().choose(rng) {
            Some(&t) => t,
            None => return false,
        };
        let tour = solution.tour(t);
        let len = tour
            .len()
            .min(self.params.max_seed_segment_len)
            .min(target)
            .max(1);
        let start = rng.gen_range(0..=tour.len() - len);
        for &c in &tour.customers()[start..start + len] {
            selected.insert(c);
        }
        true
    }

    fn pick_pivot<R: Rng>(&self, frontier: &[CustomerId], rng: &mut R) -> usize {
        debug_assert!(!frontier.is_empty());
        if frontier.len() > RECENT_WINDOW && rng.gen_bool(self.params.recent_pivot_bias) {
            rng.gen_range(frontier.len() - RECENT_WINDOW..frontier.len())
        } else {
            rng.gen_range(0..frontier.len())
        }
    }

    /// Assembles a bounded candidate batch for one pivot from an ordered
    /// chain of generators: tour mates first (probability-gated), then the k
    /// nearest unselected spatial neighbors.
    fn candidate_batch<R: Rng>(
        &self,
        solution: &Solution,
        pivot: CustomerId,
        selected: &RemovalSet,
        rng: &mut R,
    ) -> ArrayVec<[CustomerId; MAX_CANDIDATE_BATCH]> {
        let mut batch: ArrayVec<[CustomerId; MAX_CANDIDATE_BATCH]> = ArrayVec::default();
        for source in [CandidateSource::TourMates, CandidateSource::SpatialNeighbors] {
            match source {
                CandidateSource::TourMates => {
                    if !rng.gen_bool(self.params.tour_mate_probability) {
                        continue;
                    }
                    let (pred, succ) = solution.tour_neighbors_of(pivot);
                    for mate in [pred, succ].into_iter().flatten() {
                        if !selected.contains(mate) && batch.len() < batch.capacity() {
                            batch.push(mate);
                        }
                    }
                }
                CandidateSource::SpatialNeighbors => {
                    let k = rng.gen_range(
                        self.params.min_neighbors_per_pivot..=self.params.max_neighbors_per_pivot,
                    );
                    let mut taken = 0;
                    for &neighbor in self.instance.neighbors_of(pivot) {
                        if taken >= k || batch.len() >= batch.capacity() {
                            break;
                        }
                        if !selected.contains(neighbor) && !batch.contains(&neighbor) {
                            batch.push(neighbor);
                            taken += 1;
                        }
                    }
                }
            }
        }
        batch
    }

    fn accepts<R: Rng>(
        &self,
        solution: &Solution,
        pivot: CustomerId,
        candidate: CustomerId,
        rank: usize,
        rng: &mut R,
    ) -> bool {
        let p = &self.params;
        let mut accept = p.base_accept_probability * p.rank_decay.powi(rank as i32);
        if solution.tour_of(candidate).is_some()
            && solution.tour_of(candidate) == solution.tour_of(pivot)
        {
            accept += p.same_tour_bonus;
        }
        rng.gen_bool(accept.clamp(0.0, 1.0))
    }
}

fn uniform_customer<R: Rng>(n: usize, rng: &mut R) -> CustomerId {
    CustomerId::new(rng.gen_range(1..=n))
}

fn random_routed_customer<R: Rng>(solution: &Solution, rng: &mut R) -> Option<CustomerId> {
    let tours: Vec<usize> = (0..solution.tours().len())
        .filter(|&t| !solution.tour(t).is_empty())
        .collect();
    let t = *tours.as_slice().choose(rng)?;
    solution.tour(t).customers().choose(rng).copied()
}

fn reseed_uniform<R: Rng>(n: usize, selected: &RemovalSet, rng: &mut R) -> Option<CustomerId> {
    for _ in 0..MAX_RESEED_ATTEMPTS {
        let c = uniform_customer(n, rng);
        if !selected.contains(c) {
            return Some(c);
        }
    }
    // dense selections: scanning for the first open id keeps the call bounded
    (1..=n).map(CustomerId::new).find(|&c| !selected.contains(c))
}

/// Tops the selection up to exactly `target` ids with a uniform random
/// distinct sample of the remaining customers.
fn fill_uniform_random<R: Rng>(
    n: usize,
    target: usize,
    selected: &mut RemovalSet,
    rng: &mut R,
) {
    let mut pool: Vec<CustomerId> = (1..=n)
        .map(CustomerId::new)
        .filter(|&c| !selected.contains(c))
        .collect();
    pool.shuffle(rng);
    for c in pool {
        if selected.len() >= target {
            break;
        }
        selected.insert(c);
    }
}

fn sanitized(mut params: ClusterRemovalParameters) -> ClusterRemovalParameters {
    params.tour_mate_probability = params.tour_mate_probability.clamp(0.0, 1.0);
    params.base_accept_probability = params.base_accept_probability.clamp(0.0, 1.0);
    params.rank_decay = params.rank_decay.clamp(0.0, 1.0);
    params.same_tour_bonus = params.same_tour_bonus.clamp(0.0, 1.0);
    params.recent_pivot_bias = params.recent_pivot_bias.clamp(0.0, 1.0);
    params.min_neighbors_per_pivot = params.min_neighbors_per_pivot.max(1);
    params.max_neighbors_per_pivot = params
        .max_neighbors_per_pivot
        .max(params.min_neighbors_per_pivot);
    params.max_seed_segment_len = params.max_seed_segment_len.max(1);
    params.stall_limit = params.stall_limit.max(1);
    params.max_expansion_attempts = params.max_expansion_attempts.max(1);
    params
}
