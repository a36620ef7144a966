pub mod repository;

pub use repository::PageCounts;
