pub mod monad;
pub use monad::*;

pub mod tap;
pub use tap::*;
