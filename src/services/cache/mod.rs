//! 三级缓存：进程内存 → 持久层（Postgres）→ 内置种子数据

pub mod layered;
pub mod memory;
pub mod postgres;
pub mod store;

pub use layered::LayeredCache;
pub use memory::MemoryCache;
pub use postgres::PgIdiomStore;
pub use store::{IdiomStore, MemoryIdiomStore};
