#![allow(clippy::missing_safety_doc)]
pub mod app;
pub mod cast;
pub mod fixture;
