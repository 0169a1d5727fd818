//! Unit definitions and lifecycle
//!
//! A [`Unit`] is one `.service` descriptor: it can render itself, be parsed
//! back from disk, and drive `systemctl` through an [`crate::exec::Executor`].

pub mod descriptor;
mod fs;
mod unit;

pub use descriptor::{parse_flat, render, FlatDescriptor, Section};
pub use fs::{HostFs, UnitFs};
pub use unit::{Unit, UnitInfo, UnitOptions};

#[cfg(test)]
pub(crate) use fs::fake;

use std::path::PathBuf;

use crate::exec::ExecError;

/// Descriptor file extension
pub const UNIT_EXTENSION: &str = "service";

/// Where descriptors are written unless configured otherwise
pub const DEFAULT_INSTALL_ROOT: &str = "/etc/systemd/system";

/// Target a unit attaches to on enable
pub const DEFAULT_WANTED_BY: &str = "multi-user.target";

pub const DEFAULT_SERVICE_TYPE: &str = "oneshot";

/// The service-control utility
pub const SYSTEMCTL: &str = "systemctl";

#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("Unit already loaded: {}", .0.display())]
    AlreadyLoaded(PathBuf),

    #[error("Unit not loaded: {0}")]
    NotLoaded(String),

    #[error("Empty or invalid unit file: {}", .0.display())]
    InvalidDescriptor(PathBuf),

    #[error("Path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Invalid unit name: {0:?}")]
    InvalidName(String),

    #[error("Invalid {field} for unit {unit}: values must be a single line")]
    InvalidValue { unit: String, field: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot quote descriptor for {0}: contains a NUL byte")]
    Quote(String),

    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Strip a trailing `.service` so `web` and `web.service` name the same unit
pub fn normalize_name(name: &str) -> &str {
    name.strip_suffix(".service").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("web"), "web");
        assert_eq!(normalize_name("web.service"), "web");
        assert_eq!(normalize_name("web.socket"), "web.socket");
    }

    #[test]
    fn test_error_messages() {
        let err = UnitError::AlreadyLoaded(PathBuf::from("/etc/systemd/system/web.service"));
        assert_eq!(
            err.to_string(),
            "Unit already loaded: /etc/systemd/system/web.service"
        );
        assert_eq!(UnitError::NotLoaded("web".into()).to_string(), "Unit not loaded: web");
    }
}
