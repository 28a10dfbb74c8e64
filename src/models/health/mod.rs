//! Health domain models

pub mod diagnosis;

pub use diagnosis::Diagnosis;
