// File: src/core/mod.rs
pub mod cascade;
pub mod confusion;
pub mod context;
pub mod engine;
pub mod index;
pub mod normalize;
pub mod types;
pub mod validator;
