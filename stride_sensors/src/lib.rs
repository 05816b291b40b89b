#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Sensor sources for the stride pipeline.
//!
//! Real device backends plug in behind `stride_traits::ImuSource` and carry
//! their own error types across that boundary; this crate currently ships
//! the deterministic (and infallible) `SimulatedImu` used for development,
//! tests, and demo runs.

pub mod sim;

pub use sim::SimulatedImu;
