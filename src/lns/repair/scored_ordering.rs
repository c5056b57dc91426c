use itertools::{Itertools, MinMaxResult};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::lns::repair::{OrderStrategy, OrderingParameters};
use crate::problem::instance::Instance;
use crate::problem::{CustomerId, Num};

/// Guard for divisions by near-zero attributes.
const DIV_EPSILON: f64 = 1e-6;

/// Sorts `customers` ascending by one scalar score per customer. Jitter
/// breaks ties and diversifies repeated calls; keys are `(Num, CustomerId)`
/// pairs, so the comparator is a strict total order even when scores
/// collide. An all-equal score vector degenerates to a shuffle.
pub(super) fn order_by_score<R: Rng>(
    instance: &Instance,
    params: &OrderingParameters,
    strategy: OrderStrategy,
    customers: &mut Vec<CustomerId>,
    rng: &mut R,
) {
    let scores: Vec<f64> = match strategy {
        OrderStrategy::Composite => composite_scores(instance, customers, rng),
        _ => customers
            .iter()
            .map(|&c| raw_score(instance, strategy, c))
            .collect(),
    };

    if degenerate(&scores) {
        customers.shuffle(rng);
        return;
    }

    let mut keyed: Vec<(Num, CustomerId)> = customers
        .iter()
        .zip(scores.iter())
        .map(|(&c, &score)| {
            let noise = rng.gen::<f64>() * params.jitter_factor * (1.0 + score.abs());
            (Num::from(sanitize(score + noise)), c)
        })
        .collect();
    keyed.sort_unstable();
    if rng.gen_bool(params.reverse_probability) {
        keyed.reverse();
    }

    for (slot, (_score, c)) in customers.iter_mut().zip(keyed) {
        *slot = c;
    }
}

fn raw_score(instance: &Instance, strategy: OrderStrategy, customer: CustomerId) -> f64 {
    let node = instance.node(customer);
    match strategy {
        OrderStrategy::TimeWindowWidth => node.tw_width().to_f64(),
        OrderStrategy::TimeWindowStart => node.ready.to_f64(),
        OrderStrategy::TimeWindowEnd => -node.due.to_f64(),
        OrderStrategy::Demand => -(node.demand as f64),
        OrderStrategy::Far => -instance.distance_to_depot(customer).to_f64(),
        OrderStrategy::Close => instance.distance_to_depot(customer).to_f64(),
        OrderStrategy::PrizeDensity => {
            -(node.prize.to_f64() / (node.demand as f64).max(DIV_EPSILON))
        }
        OrderStrategy::Shuffle
        | OrderStrategy::Composite
        | OrderStrategy::NearestNeighborChain => unreachable!("not score-based"),
    }
}

/// Normalized weighted blend of distance, demand, window width and prize;
/// weights and the polarity of the distance and width components are drawn
/// fresh on every call.
fn composite_scores<R: Rng>(
    instance: &Instance,
    customers: &[CustomerId],
    rng: &mut R,
) -> Vec<f64> {
    let w_distance = rng.gen::<f64>();
    let w_demand = rng.gen::<f64>();
    let w_width = rng.gen::<f64>();
    let w_prize = rng.gen::<f64>();
    let flip_distance = rng.gen_bool(0.5);
    let flip_width = rng.gen_bool(0.5);

    let mut distances: Vec<f64> = customers
        .iter()
        .map(|&c| instance.distance_to_depot(c).to_f64())
        .collect();
    let mut demands: Vec<f64> = customers
        .iter()
        .map(|&c| instance.demand(c) as f64)
        .collect();
    let mut widths: Vec<f64> = customers
        .iter()
        .map(|&c| instance.node(c).tw_width().to_f64())
        .collect();
    let mut prizes: Vec<f64> = customers
        .iter()
        .map(|&c| instance.prize(c).to_f64())
        .collect();
    normalize(&mut distances);
    normalize(&mut demands);
    normalize(&mut widths);
    normalize(&mut prizes);

    (0..customers.len())
        .map(|i| {
            let distance = if flip_distance {
                1.0 - distances[i]
            } else {
                distances[i]
            };
            let width = if flip_width { 1.0 - widths[i] } else { widths[i] };
            w_distance * distance
                + w_demand * demands[i]
                + w_width * width
                + w_prize * (1.0 - prizes[i])
        })
        .collect()
}

fn normalize(values: &mut [f64]) {
    if let MinMaxResult::MinMax(lo, hi) = values.iter().copied().minmax() {
        let span = hi - lo;
        if span > DIV_EPSILON {
            for v in values.iter_mut() {
                *v = (*v - lo) / span;
            }
            return;
        }
    }
    for v in values.iter_mut() {
        *v = 0.0;
    }
}

fn degenerate(scores: &[f64]) -> bool {
    match scores.iter().copied().minmax() {
        MinMaxResult::MinMax(lo, hi) => hi - lo < DIV_EPSILON,
        _ => true,
    }
}

/// Non-finite scores collapse to finite sentinels so the sort keys keep a
/// total order.
fn sanitize(score: f64) -> f64 {
    if score.is_finite() {
        score
    } else if score.is_nan() {
        0.0
    } else if score > 0.0 {
        1e12
    } else {
        -1e12
    }
}
