use regiontree::RegionTreeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// The presentation layer could not produce a texture.
    #[error("failed to load texture {path}: {reason}")]
    Texture { path: String, reason: String },
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Tree(#[from] RegionTreeError),
}

pub type SimResult<T> = Result<T, SimError>;
