//! Contains the [`SasVariable`] type.

/// A variable block, i.e.
///
/// ```text
/// begin_variable
/// var0
/// -1
/// 2
/// Atom handempty()
/// NegatedAtom handempty()
/// end_variable
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasVariable {
    name: String,
    /// `-1` for state variables, anything else marks a derived variable.
    axiom_layer: i32,
    value_names: Vec<String>,
}

impl SasVariable {
    pub const fn new(name: String, axiom_layer: i32, value_names: Vec<String>) -> Self {
        Self {
            name,
            axiom_layer,
            value_names,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn axiom_layer(&self) -> i32 {
        self.axiom_layer
    }

    pub fn domain_size(&self) -> usize {
        self.value_names.len()
    }

    pub const fn value_names(&self) -> &Vec<String> {
        &self.value_names
    }
}
