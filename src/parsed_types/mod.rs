//! Plain data produced by the SAS parser. Nothing here is validated beyond
//! the syntax, see [`Task`](crate::search::Task) for the checked model.

mod sas_effect;
mod sas_fact;
mod sas_operator;
mod sas_task;
mod sas_variable;

pub use sas_effect::SasEffect;
pub use sas_fact::SasFact;
pub use sas_operator::SasOperator;
pub use sas_task::SasTask;
pub use sas_variable::SasVariable;
