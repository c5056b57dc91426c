use std::fmt::{Display, Formatter};

pub mod distance_matrix;
pub mod instance;

pub type Num = crate::utils::num::Num;

/// Demand and capacity units.
pub type Capacity = i32;

/// Identifier of a customer node, valid in `1..=num_customers`. The depot is
/// node `0` and is never represented as a `CustomerId`, so no operator can
/// emit it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct CustomerId(u32);

impl CustomerId {
    #[inline(always)]
    pub fn new(id: usize) -> Self {
        debug_assert!(id > 0, "node 0 is the depot, not a customer");
        CustomerId(id as u32)
    }

    /// Position of this customer in node-indexed storage (depot at 0).
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
