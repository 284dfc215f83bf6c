pub mod page;
pub mod record;
pub mod stats;

pub use page::*;
pub use record::*;
pub use stats::*;
