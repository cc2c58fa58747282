pub mod controller;
pub mod fixtures;
