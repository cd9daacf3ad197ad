pub mod error;
pub mod grid;
pub mod stats;
pub mod traits;
pub mod types;

pub use error::*;
pub use grid::*;
pub use traits::*;
pub use types::*;
