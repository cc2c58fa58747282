// Nightly clippy (0.1.64) considers Drop a side effect, see https://github.com/rust-lang/rust-clippy/issues/9608
#![allow(clippy::unnecessary_lazy_evaluations)]

pub mod common;
pub mod config;
pub mod controller;
pub mod deploymentcopy_types;
pub mod error;
pub mod merge;
pub mod ownership;
pub mod reconciler;
pub mod store;

#[cfg(test)]
mod unit_tests;

pub use error::Error;
