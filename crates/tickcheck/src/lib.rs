//! Frame-budgeted test scheduler.
//!
//! Tests run inside a host's fixed-rate tick loop instead of all at once:
//! single-frame tests are drained within each frame's time budget and spill
//! into later frames, multi-frame tests are polled once per frame until they
//! report done, and the aggregate `success / total` is logged at the end.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`registry`] | `TestRegistry`, `SingleFrameTest`, `MultiFrameTest` |
//! | [`results`] | `TestResult`, `Checker`, `CheckFailure` |
//! | [`scheduler`] | `Scheduler`, `State`, `SchedulerConfig` |
//! | [`harness`] | `Harness` builder |
//!
//! # Driving it by hand
//!
//! ```rust
//! use tickcheck::Scheduler;
//! use tickcheck_engine::tick::{TickConfig, TickDriver};
//!
//! let scheduler = Scheduler::new();
//! let check = scheduler.checker();
//! scheduler.register_single_frame("sum", move || check.check(2 + 2 == 4)).unwrap();
//!
//! let mut driver = TickDriver::new(TickConfig { sleep: false, ..TickConfig::default() });
//! scheduler.start(&mut driver).unwrap();
//! driver.run();
//!
//! assert_eq!(scheduler.last_result().unwrap().to_string(), "1 / 1");
//! ```

pub mod harness;
pub mod registry;
pub mod results;
pub mod scheduler;

pub use harness::Harness;
pub use registry::{RegistryError, TestRegistry};
pub use results::{CheckFailure, Checker, TestResult};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerError, State};
