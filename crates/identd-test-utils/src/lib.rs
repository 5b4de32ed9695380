//! identd-test-utils: Test infrastructure for identd.
//!
//! Provides:
//! - MockOwner: Scripted owner with mutable live addressing
//! - MockDirectory: In-memory owner directory with a fixed enumeration order

mod mock_owner;

pub use mock_owner::{MockDirectory, MockOwner, addressing};
