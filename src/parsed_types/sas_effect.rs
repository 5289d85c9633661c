//! Contains the [`SasEffect`] type.

use crate::parsed_types::SasFact;

/// One effect line of an operator: `ncond (cvar cval)* var pre post`. A
/// precondition of `-1` is stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasEffect {
    conditions: Vec<SasFact>,
    var: usize,
    pre: Option<usize>,
    post: usize,
}

impl SasEffect {
    pub const fn new(conditions: Vec<SasFact>, var: usize, pre: Option<usize>, post: usize) -> Self {
        Self {
            conditions,
            var,
            pre,
            post,
        }
    }

    pub const fn conditions(&self) -> &Vec<SasFact> {
        &self.conditions
    }

    pub const fn var(&self) -> usize {
        self.var
    }

    pub const fn pre(&self) -> Option<usize> {
        self.pre
    }

    pub const fn post(&self) -> usize {
        self.post
    }
}
