pub mod chain;
pub mod pool;
pub mod shapes;

pub use chain::Chain;
pub use pool::IndexPool;
pub use shapes::{Point, Rectangle};
