//! Domain models for the radiography reporting system.

mod analysis;
mod client;
mod grade;
mod region;
mod report;

pub use analysis::*;
pub use client::*;
pub use grade::*;
pub use region::*;
pub use report::*;
