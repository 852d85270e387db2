#[derive(Debug, Clone)]
pub struct Config {
    /// Nodes reserved up front.
    pub pool_size: usize,
    /// Deepest level a node may subdivide into. The root is depth 0.
    pub max_depth: u32,
    /// Nodes whose quadrants would be narrower than this stop subdividing.
    pub min_size: f32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pool_size: 256,
            max_depth: 16,
            min_size: 1.0 / 64.0,
        }
    }
}
