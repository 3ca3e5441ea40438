pub mod browser;
pub mod engine;
pub mod frontier;
pub mod web;
