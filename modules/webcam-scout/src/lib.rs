pub mod aggregate;
pub mod details;
pub mod discovery;
pub mod playlist;
pub mod resolver;
pub mod retry;
pub mod scheduler;
pub mod scout;
pub mod stats;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
