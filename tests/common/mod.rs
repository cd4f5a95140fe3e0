//! Shared test utilities

#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod mock_channel;

pub use fixtures::*;
pub use mock_channel::MockChannel;
