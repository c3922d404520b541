//! Cooperative worker manager for acquisition pipelines.
//!
//! A [`Manager`] owns a set of workers, each on its own thread:
//!
//! - **One-shot** workers ([`Manager::add_thread`]) run a closure once.
//! - **Loop** workers ([`Manager::add_loop_thread`]) run a closure once per
//!   period while the manager is running, sleeping off whatever is left of
//!   the period after each call.
//!
//! Each worker has an enabled flag ([`Manager::interrupt_thread`],
//! [`Manager::start`], [`Manager::stop`]); a disabled loop worker keeps its
//! schedule but skips its body. [`Manager::close`] disables everything,
//! clears the run flag and joins every worker. Shutdown is cooperative:
//! bodies must return in bounded time for `close` to finish.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use physio_manager::{Manager, WorkerConfig};
//!
//! let manager = Arc::new(Manager::new());
//!
//! // A "self" loop doing periodic work.
//! manager
//!     .add_loop_thread_with(
//!         &WorkerConfig::new().name("self").period(Duration::from_millis(10)),
//!         || {},
//!     )
//!     .unwrap();
//!
//! // An "input" loop that shuts everything down on its own.
//! let handle = Arc::clone(&manager);
//! manager
//!     .add_loop_thread(Duration::from_millis(10), move || handle.close())
//!     .unwrap();
//!
//! manager.wait();
//! assert!(!manager.is_running());
//! ```

mod config;
mod error;
mod manager;
mod worker;

pub use config::WorkerConfig;
pub use error::{Error, Result};
pub use manager::Manager;
pub use worker::WorkerId;
