pub mod idiom;
pub mod report;
