pub mod pitch;
pub mod smoothing;
pub mod trim;
