//! Application subsystem.
//!
//! # Data Flow
//! ```text
//! Server / Tester
//!     → Application::serve (panic boundary)
//!     → Application::handler
//!         → BeforeDispatch hooks
//!         → Static dispatch → AfterStatic hooks
//!           or Routes::dispatch
//!         → AfterDispatch hooks
//!         → render finalize, default 200
//!     → Response::write_to_writer
//! ```

pub mod application;
pub mod context;
pub mod hooks;

pub use application::Application;
pub use context::Context;
pub use hooks::{HookHandler, Hooks, AFTER_DISPATCH, AFTER_STATIC, BEFORE_DISPATCH};
