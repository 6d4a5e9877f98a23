//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Confirm store connectivity → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, the process exits non-zero
//! - The listener opens last; traffic only flows once the store is
//!   confirmed
//! - Startup runs exactly once per process

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
