//! Common traits shared by the pipeline and the IO layer

pub mod traits;

pub use traits::*;
