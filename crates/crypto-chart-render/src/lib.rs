pub mod chart;
pub mod error;
pub mod renderer;
pub mod viewer;
