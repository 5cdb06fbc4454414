pub mod cache;
pub mod catalog;
pub mod crawler;
pub mod merge;
pub mod resolver;
pub mod search;
pub mod seed;
pub mod sources;
