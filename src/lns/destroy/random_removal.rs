use rand::seq::index;
use rand::Rng;

use crate::problem::instance::Instance;
use crate::problem::CustomerId;
use crate::solution::Solution;

/// Uniform distinct sample over all customers; the unbiased baseline among
/// the destroy operators.
pub struct RandomRemoval<'a> {
    instance: &'a Instance,
}

impl<'a> RandomRemoval<'a> {
    pub fn with_instance(instance: &'a Instance) -> Self {
        Self { instance }
    }

    pub fn select<R: Rng>(&self, _solution: &Solution, rng: &mut R, num: usize) -> Vec<CustomerId> {
        let n = self.instance.num_customers();
        if n == 0 {
            return Vec::new();
        }
        let num = num.min(n).max(1);
        index::sample(rng, n, num)
            .iter()
            .map(|i| CustomerId::new(i + 1))
            .collect()
    }
}
