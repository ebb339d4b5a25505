pub mod engine;
pub mod key_lock;

pub use engine::{check_and_consume, DenyReason, Decision};
pub use key_lock::KeyLocks;
