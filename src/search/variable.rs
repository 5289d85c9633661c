#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub id: usize,
    pub name: String,
    /// Names of the values, the domain size is their number.
    pub fact_names: Vec<String>,
}

impl Variable {
    pub fn domain_size(&self) -> usize {
        self.fact_names.len()
    }

    pub fn fact_name(&self, value: usize) -> &str {
        &self.fact_names[value]
    }
}
