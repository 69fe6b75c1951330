pub mod cycles;
pub mod diagram;
pub mod generate;
pub mod relations;
pub mod summarize;
pub mod tools;
