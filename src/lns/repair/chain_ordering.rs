use rand::Rng;

use crate::problem::instance::Instance;
use crate::problem::CustomerId;
use crate::utils::rcl::RCL;

/// Candidates kept per link when the chain deviates from the greedy pick.
const CHAIN_RCL_SIZE: usize = 3;

/// Reorders `customers` into a nearest-neighbor chain: starting from a
/// random customer, the next position always goes to the unplaced customer
/// closest to the last-placed one — or, with `noise_probability`, to a
/// random member of the restricted candidate list of closest ones.
pub(super) fn order_by_chain<R: Rng>(
    instance: &Instance,
    noise_probability: f64,
    customers: &mut Vec<CustomerId>,
    rng: &mut R,
) {
    debug_assert!(customers.len() > 1);
    let mut remaining = std::mem::take(customers);
    let start = rng.gen_range(0..remaining.len());
    let mut last = remaining.swap_remove(start);
    customers.push(last);

    let mut rcl: RCL<usize, CHAIN_RCL_SIZE> = RCL::new();
    while !remaining.is_empty() {
        rcl.clear();
        for (pos, &candidate) in remaining.iter().enumerate() {
            rcl.push((instance.distance_between(last, candidate), pos));
        }
        let pos = if rng.gen_bool(noise_probability) {
            rcl.pop_random_and_clear(rng)
        } else {
            rcl.pop_first_and_clear()
        };
        last = remaining.swap_remove(pos);
        customers.push(last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::instance::{instance_from_coords, ProblemVariant};
    use crate::utils::create_seeded_rng;

    #[test]
    fn chain_visits_every_customer_exactly_once() {
        let coords: Vec<(f64, f64)> = (0..9).map(|i| (i as f64, (i % 3) as f64)).collect();
        let instance = instance_from_coords(ProblemVariant::Capacitated, 100, &coords);
        let mut rng = create_seeded_rng(61);

        for noise in [0.0, 0.5, 1.0] {
            let mut customers: Vec<CustomerId> = (1..=8).map(CustomerId::new).collect();
            order_by_chain(&instance, noise, &mut customers, &mut rng);
            let mut sorted = customers.clone();
            sorted.sort_unstable();
            assert_eq!((1..=8).map(CustomerId::new).collect::<Vec<_>>(), sorted);
        }
    }

    #[test]
    fn noisy_links_stay_within_the_candidate_list() {
        let coords: Vec<(f64, f64)> = (0..7).map(|i| (2f64.powi(i), 0.0)).collect();
        let instance = instance_from_coords(ProblemVariant::Capacitated, 100, &coords);
        let mut rng = create_seeded_rng(62);

        for _ in 0..20 {
            let mut customers: Vec<CustomerId> = (1..=6).map(CustomerId::new).collect();
            order_by_chain(&instance, 1.0, &mut customers, &mut rng);
            for i in 0..customers.len() - 1 {
                let chosen = instance.distance_between(customers[i], customers[i + 1]);
                let closer = customers[i + 1..]
                    .iter()
                    .filter(|&&c| instance.distance_between(customers[i], c) < chosen)
                    .count();
                assert!(
                    closer < CHAIN_RCL_SIZE,
                    "link skipped more than the candidate list allows"
                );
            }
        }
    }
}
