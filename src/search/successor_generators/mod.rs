mod successor_generator;
mod successor_generator_factory;

pub use successor_generator::SuccessorGenerator;
pub use successor_generator_factory::SuccessorGeneratorFactory;
