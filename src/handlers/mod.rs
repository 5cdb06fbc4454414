pub mod crawl_handler;
pub mod idiom_handler;
pub mod search_handler;
pub mod stats_handler;
