// src/handlers/mod.rs

pub mod auth;
pub mod brain_bucks;
pub mod quiz;
pub mod results;
pub mod students;
pub mod subjects;
pub mod teachers;
