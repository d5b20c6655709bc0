// src/models/mod.rs

pub mod brain_bucks;
pub mod result;
pub mod student;
pub mod subject;
pub mod teacher;
pub mod test;
pub mod user;
