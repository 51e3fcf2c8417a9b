// src/handlers/mod.rs

pub mod auth;
pub mod problem;
pub mod solution;
pub mod submission;
