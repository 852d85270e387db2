pub mod config;
pub mod error;
mod maintenance;
pub mod node;
mod query;
pub mod source;
pub mod tree;

pub use config::Config;
pub use error::{RegionTreeError, RegionTreeResult};
pub use maintenance::UpdateStats;
pub use node::{NodeId, COLLAPSE_THRESHOLD, NODE_CAPACITY};
pub use source::EntitySource;
pub use tree::RegionTree;
