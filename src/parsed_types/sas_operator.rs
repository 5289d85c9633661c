//! Contains the [`SasOperator`] type.

use crate::parsed_types::{SasEffect, SasFact};

/// An operator block. Its precondition is the prevail facts together with the
/// defined `pre` values of its effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasOperator {
    name: String,
    prevail: Vec<SasFact>,
    effects: Vec<SasEffect>,
    cost: i32,
}

impl SasOperator {
    pub const fn new(name: String, prevail: Vec<SasFact>, effects: Vec<SasEffect>, cost: i32) -> Self {
        Self {
            name,
            prevail,
            effects,
            cost,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn prevail(&self) -> &Vec<SasFact> {
        &self.prevail
    }

    pub const fn effects(&self) -> &Vec<SasEffect> {
        &self.effects
    }

    pub const fn cost(&self) -> i32 {
        self.cost
    }
}
