use serde::{Deserialize, Serialize};

/// Operator costs and heuristic values. Negative values never occur, and
/// [`INFINITE_COST`] is used as a saturating "unreachable" value.
pub type Cost = i32;

pub const INFINITE_COST: Cost = Cost::MAX;

/// Transformation applied to operator costs before they are used by a search
/// engine or heuristic.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[clap(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum OperatorCost {
    #[default]
    #[clap(help = "Use the costs of the task.")]
    Normal,
    #[clap(help = "All operators cost 1.")]
    One,
    #[clap(help = "Add 1 to every cost, unless the task is already unit cost.")]
    PlusOne,
}

impl OperatorCost {
    pub fn adjust(&self, cost: Cost, is_unit_cost: bool) -> Cost {
        match self {
            OperatorCost::Normal => cost,
            OperatorCost::One => 1,
            OperatorCost::PlusOne => {
                if is_unit_cost {
                    1
                } else {
                    cost.saturating_add(1)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_costs() {
        assert_eq!(OperatorCost::Normal.adjust(3, false), 3);
        assert_eq!(OperatorCost::One.adjust(3, false), 1);
        assert_eq!(OperatorCost::PlusOne.adjust(3, false), 4);
        assert_eq!(OperatorCost::PlusOne.adjust(1, true), 1);
        assert_eq!(OperatorCost::PlusOne.adjust(0, false), 1);
    }
}
