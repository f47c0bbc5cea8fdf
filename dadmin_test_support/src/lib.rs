mod assert;
mod mock;

pub use assert::*;
pub use mock::*;
