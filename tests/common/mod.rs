#![allow(dead_code)]

pub mod mock_target;
pub mod strategies;

pub use mock_target::*;
pub use strategies::*;
