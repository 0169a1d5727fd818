//! Operations over every registered unit
//!
//! Bulk operations never stop early: each unit is visited in name order and
//! its outcome recorded in a [`BulkReport`].

use super::UnitManager;
use crate::exec::ExecResult;
use crate::units::{Unit, UnitError};

/// Per-unit outcome of a bulk operation
#[derive(Debug, Default)]
pub struct BulkReport {
    pub results: Vec<(String, Result<ExecResult, UnitError>)>,
}

impl BulkReport {
    /// No unit returned an error
    ///
    /// Non-zero exit codes are still `Ok` entries; see [`Self::all_succeeded`].
    pub fn is_ok(&self) -> bool {
        self.results.iter().all(|(_, r)| r.is_ok())
    }

    /// No errors and every command reported success
    pub fn all_succeeded(&self) -> bool {
        self.results
            .iter()
            .all(|(_, r)| r.as_ref().is_ok_and(ExecResult::success))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &UnitError)> {
        self.results
            .iter()
            .filter_map(|(name, r)| r.as_ref().err().map(|e| (name.as_str(), e)))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl UnitManager {
    fn for_each<F>(&self, action: &str, op: F) -> BulkReport
    where
        F: Fn(&Unit) -> Result<ExecResult, UnitError>,
    {
        let mut report = BulkReport::default();

        for unit in self.units() {
            let result = op(unit);
            if let Err(e) = &result {
                log::warn!("{} {} failed: {}", action, unit.name(), e);
            }
            report.results.push((unit.name().to_string(), result));
        }

        log::info!(
            "{}: {} unit(s), {} failed",
            action,
            report.len(),
            report.failures().count()
        );
        report
    }

    pub fn start_all(&self) -> BulkReport {
        self.for_each("start", Unit::start)
    }

    pub fn stop_all(&self) -> BulkReport {
        self.for_each("stop", Unit::stop)
    }

    pub fn restart_all(&self) -> BulkReport {
        self.for_each("restart", Unit::restart)
    }

    pub fn reload_all(&self) -> BulkReport {
        self.for_each("reload", Unit::reload_unit)
    }

    pub fn load_all(&self) -> BulkReport {
        self.for_each("load", Unit::load)
    }

    pub fn unload_all(&self) -> BulkReport {
        self.for_each("unload", Unit::unload)
    }

    pub fn enable_all(&self) -> BulkReport {
        self.for_each("enable", Unit::enable)
    }

    pub fn disable_all(&self) -> BulkReport {
        self.for_each("disable", Unit::disable)
    }

    /// Stop everything
    pub fn kill_switch(&self) -> BulkReport {
        log::warn!("Kill switch: stopping {} unit(s)", self.len());
        self.for_each("kill-switch", Unit::stop)
    }
}
