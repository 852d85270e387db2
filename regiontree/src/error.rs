use crate::node::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionTreeError {
    #[error("tree bounds must be finite with positive width/height (x: {x}, y: {y}, width: {width}, height: {height})")]
    InvalidBounds {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    #[error("node {node:?} is inconsistent: {reason}")]
    Inconsistent { node: NodeId, reason: String },
}

pub type RegionTreeResult<T> = Result<T, RegionTreeError>;
