mod int_packer;
mod per_state_information;
mod state;
mod state_registry;

pub use int_packer::IntPacker;
pub use per_state_information::PerStateInformation;
pub use state::{State, StateId, NO_STATE};
pub use state_registry::StateRegistry;
