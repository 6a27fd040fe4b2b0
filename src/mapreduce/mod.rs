// src/mapreduce/mod.rs

//! Bounded-concurrency map/reduce over arbitrary sequences.
//!
//! - [`window`] defines [`Window`], the cap on concurrently active transforms.
//! - [`scheduler`] owns the core [`Scheduler::try_map_reduce`] loop: a
//!   `JoinSet` of at most `window` transforms plus one coordinating lane that
//!   combines results in completion order.
//! - [`collect`] builds the named specializations (`for_each`, `map`,
//!   `filter_map`, `map_to_map`, `filter_map_to_map`) on top of the core loop.

pub mod collect;
pub mod scheduler;
pub mod window;

pub use collect::Duplicates;
pub use scheduler::Scheduler;
pub use window::Window;
