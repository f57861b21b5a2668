//! CLI commands implementation

pub mod index;
pub mod init;
pub mod search;
pub mod statistics;

pub use index::*;
pub use init::*;
pub use search::*;
pub use statistics::*;
