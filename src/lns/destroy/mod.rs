use fixedbitset::FixedBitSet;
use rand::Rng;

pub mod cluster_removal;
mod random_removal;

pub use cluster_removal::ClusterRemoval;
pub use random_removal::RandomRemoval;

use crate::problem::CustomerId;
use crate::solution::Solution;

pub enum DestroyOperators<'a> {
    ClusterRemoval(ClusterRemoval<'a>),
    RandomRemoval(RandomRemoval<'a>),
}

pub fn select_removal_generic<R: Rng>(
    op: &DestroyOperators,
    solution: &Solution,
    rng: &mut R,
    num: usize,
) -> Vec<CustomerId> {
    match op {
        DestroyOperators::ClusterRemoval(op) => op.select(solution, rng, num),
        DestroyOperators::RandomRemoval(op) => op.select(solution, rng, num),
    }
}

/// Distinct-id working set of a single destroy call. Membership checks go
/// through a bitset sized to the instance, never through hashing.
pub(crate) struct RemovalSet {
    list: Vec<CustomerId>,
    member: FixedBitSet,
}

impl RemovalSet {
    pub fn with_capacity(num_customers: usize, target: usize) -> Self {
        Self {
            list: Vec::with_capacity(target),
            member: FixedBitSet::with_capacity(num_customers + 1),
        }
    }

    /// Returns false if the customer was already present.
    pub fn insert(&mut self, customer: CustomerId) -> bool {
        if self.member.put(customer.index()) {
            false
        } else {
            self.list.push(customer);
            true
        }
    }

    pub fn contains(&self, customer: CustomerId) -> bool {
        self.member.contains(customer.index())
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn list(&self) -> &[CustomerId] {
        &self.list
    }

    pub fn into_list(self) -> Vec<CustomerId> {
        self.list
    }
}
