// Output generation module

pub mod diagrams;
pub mod markdown;

pub use diagrams::*;
pub use markdown::*;
