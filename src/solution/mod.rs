use anyhow::{ensure, Result};
use fixedbitset::FixedBitSet;

use crate::problem::instance::Instance;
use crate::problem::{Capacity, CustomerId, Num};
use crate::utils::NumIndexVec;

/// One vehicle tour; the depot is implicit at both ends.
pub struct Tour {
    customers: Vec<CustomerId>,
    demand: Capacity,
    costs: Num,
}

impl Tour {
    pub(crate) fn with_customers(instance: &Instance, customers: Vec<CustomerId>) -> Self {
        let demand = customers.iter().map(|&c| instance.demand(c)).sum();
        let costs = tour_costs(instance, &customers);
        Self {
            customers,
            demand,
            costs,
        }
    }

    pub fn customers(&self) -> &[CustomerId] {
        &self.customers
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn demand(&self) -> Capacity {
        self.demand
    }

    pub fn costs(&self) -> Num {
        self.costs
    }

    pub(crate) fn position_of(&self, customer: CustomerId) -> Option<usize> {
        self.customers.iter().position(|&c| c == customer)
    }
}

fn tour_costs(instance: &Instance, customers: &[CustomerId]) -> Num {
    match (customers.first(), customers.last()) {
        (Some(&first), Some(&last)) => {
            let mut costs = instance.distance(0, first.index());
            for pair in customers.windows(2) {
                costs += instance.distance_between(pair[0], pair[1]);
            }
            costs + instance.distance(last.index(), 0)
        }
        _ => Num::ZERO,
    }
}

/// Current routing state of one search trial: the tours plus a customer to
/// tour index map (`None` iff unrouted). Owned by exactly one trial at a
/// time.
pub struct Solution<'a> {
    instance: &'a Instance,
    tours: Vec<Tour>,
    tour_of: NumIndexVec<Option<usize>>,
    total_costs: Num,
}

impl<'a> Solution<'a> {
    pub fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            tours: Vec::new(),
            tour_of: NumIndexVec::with_default(instance.num_customers() + 1, None),
            total_costs: Num::ZERO,
        }
    }

    pub fn with_tours(instance: &'a Instance, routes: Vec<Vec<CustomerId>>) -> Result<Self> {
        let n = instance.num_customers();
        let mut seen = FixedBitSet::with_capacity(n + 1);
        let mut tour_of = NumIndexVec::with_default(n + 1, None);
        for (t, route) in routes.iter().enumerate() {
            for &c in route {
                ensure!(
                    c.index() >= 1 && c.index() <= n,
                    "customer id {} outside 1..={}",
                    c,
                    n
                );
                ensure!(!seen.put(c.index()), "customer {} in more than one tour", c);
                tour_of[c] = Some(t);
            }
        }
        let tours: Vec<Tour> = routes
            .into_iter()
            .map(|route| Tour::with_customers(instance, route))
            .collect();
        let total_costs = tours.iter().map(|t| t.costs).sum();
        Ok(Self {
            instance,
            tours,
            tour_of,
            total_costs,
        })
    }

    pub fn instance(&self) -> &Instance {
        self.instance
    }

    pub fn tours(&self) -> &[Tour] {
        &self.tours
    }

    pub fn tour(&self, idx: usize) -> &Tour {
        &self.tours[idx]
    }

    pub fn tour_of(&self, customer: CustomerId) -> Option<usize> {
        self.tour_of[customer]
    }

    pub fn is_routed(&self, customer: CustomerId) -> bool {
        self.tour_of[customer].is_some()
    }

    pub fn total_costs(&self) -> Num {
        self.total_costs
    }

    /// Predecessor and successor of `customer` within its tour; `None` where
    /// the tour meets the depot, or when the customer is unrouted.
    pub fn tour_neighbors_of(&self, customer: CustomerId) -> (Option<CustomerId>, Option<CustomerId>) {
        let t = match self.tour_of[customer] {
            Some(t) => t,
            None => return (None, None),
        };
        let tour = &self.tours[t];
        match tour.position_of(customer) {
            Some(pos) => {
                let pred = if pos > 0 {
                    Some(tour.customers[pos - 1])
                } else {
                    None
                };
                let succ = tour.customers.get(pos + 1).copied();
                (pred, succ)
            }
            None => (None, None),
        }
    }

    /// Removes the given customers from their tours, the collaborator step
    /// between a destroy call and the external greedy reinsertion. Unrouted
    /// ids are ignored; tour indices of untouched customers stay valid.
    pub fn unassign_customers(&mut self, customers: &[CustomerId]) {
        let mut touched: Vec<usize> = Vec::with_capacity(customers.len());
        for &c in customers {
            if let Some(t) = self.tour_of[c] {
                self.tour_of[c] = None;
                if !touched.contains(&t) {
                    touched.push(t);
                }
            }
        }
        for t in touched {
            let keep: Vec<CustomerId> = self.tours[t]
                .customers
                .iter()
                .copied()
                .filter(|&c| self.tour_of[c].is_some())
                .collect();
            let costs_before = self.tours[t].costs;
            self.tours[t] = Tour::with_customers(self.instance, keep);
            self.total_costs += self.tours[t].costs - costs_before;
        }

        #[cfg(feature = "search_assertions")]
        self.assert_consistent();
    }

    #[cfg(feature = "search_assertions")]
    pub fn assert_consistent(&self) {
        for c in self.instance.iter_customers() {
            match self.tour_of[c] {
                Some(t) => assert!(
                    self.tours[t].position_of(c).is_some(),
                    "customer {} mapped to tour {} but not present in it",
                    c,
                    t
                ),
                None => assert!(
                    self.tours.iter().all(|tour| tour.position_of(c).is_none()),
                    "unrouted customer {} found in a tour",
                    c
                ),
            }
        }
    }
}
