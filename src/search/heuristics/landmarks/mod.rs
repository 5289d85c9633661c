//! Fact landmarks found by Zhu/Givan label propagation and the landmark
//! count heuristic built on them.

mod landmark_count;
mod landmark_factory;
mod landmark_graph;
mod landmark_status;

pub use landmark_count::LandmarkCountHeuristic;
pub use landmark_factory::generate_zhu_givan_landmarks;
pub use landmark_graph::{Landmark, LandmarkGraph};
pub use landmark_status::{LandmarkStatus, LandmarkStatusManager};
