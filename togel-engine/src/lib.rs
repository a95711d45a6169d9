pub mod config;
pub mod evaluate;
pub mod index;
pub mod models;
pub mod normalize;
pub mod report;
pub mod resolver;
pub mod selector;
