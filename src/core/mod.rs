// Core modules: error modeling and the in-process blocking primitive.
pub mod error;
pub mod signal;
