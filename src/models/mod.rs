// src/models/mod.rs

pub mod problem;
pub mod solution;
pub mod user;
