pub mod cycle;
pub mod dag;
pub mod diagram;
pub mod visualize;
