//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     path template + default stash
//!     → pattern.rs (placeholders → named regex groups)
//!     → route.rs (full and prefix anchored regexes)
//!     → router.rs (ordered Routes, nested under parents)
//!
//! Per request:
//!     Context (method, stash "path")
//!     → matcher.rs (walk the tree, collect Match stack + captures)
//!     → router.rs (call handlers in order, stop when an under route says so)
//! ```
//!
//! # Design Decisions
//! - First match wins (registration order)
//! - Leaf routes match the whole remaining path, parents only a prefix
//! - Routes are immutable while serving; registration happens before `serve`

pub mod matcher;
pub mod pattern;
pub mod route;
pub mod router;

pub use matcher::Match;
pub use route::{Handler, Route};
pub use router::{Routes, UNDER_METHODS};
