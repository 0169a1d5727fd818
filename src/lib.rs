//! sysinit - declarative systemd unit lifecycle manager
//!
//! Generates `.service` descriptors from configuration records and drives
//! `systemctl` to install, enable, start and stop them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 UnitManager                   │
//! ├──────────────────────────────────────────────┤
//! │   Unit (descriptor render/parse, lifecycle)   │
//! ├──────────────────────────────────────────────┤
//! │      Executor (dry run, elevation, shell)     │
//! └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod exec;
pub mod logging;
pub mod manager;
pub mod units;

pub use config::{Config, Environment, ServiceConfig, Settings};
pub use exec::{CommandSpec, Elevation, ExecResult, Executor};
pub use manager::{BulkReport, ManagerError, UnitManager};
pub use units::{Unit, UnitError, UnitOptions};
