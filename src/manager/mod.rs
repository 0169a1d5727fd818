//! Unit registry
//!
//! Owns every [`Unit`] by name and forwards lifecycle calls to them.

mod bulk;

pub use bulk::BulkReport;

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{Config, ConfigError, ServiceConfig};
use crate::exec::ExecResult;
use crate::units::{self, Unit, UnitError, UnitInfo, UnitOptions};

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Unit not found: {0}")]
    UnitNotFound(String),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Named collection of units, iterated in name order
#[derive(Debug, Default)]
pub struct UnitManager {
    units: BTreeMap<String, Unit>,
}

impl UnitManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one unit per record
    pub fn from_records(
        records: &[ServiceConfig],
        options: &UnitOptions,
    ) -> Result<Self, ManagerError> {
        let mut manager = Self::new();
        for record in records {
            manager.add(Unit::from_config(record, options)?);
        }
        Ok(manager)
    }

    /// Bootstrap from a parsed config; its settings overlay `options`
    pub fn from_config(config: &Config, options: UnitOptions) -> Result<Self, ManagerError> {
        let options = options.apply_settings(&config.settings);
        Self::from_records(&config.services, &options)
    }

    pub fn from_config_file(path: &Path, options: UnitOptions) -> Result<Self, ManagerError> {
        let config = Config::load(path)?;
        let manager = Self::from_config(&config, options)?;
        log::info!("Registered {} unit(s) from {}", manager.len(), path.display());
        Ok(manager)
    }

    /// Insert a unit; an existing unit with the same name is replaced
    pub fn add(&mut self, unit: Unit) {
        let name = unit.name().to_string();
        if self.units.insert(name.clone(), unit).is_some() {
            log::debug!("Replaced unit {}", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Unit> {
        self.units.get(units::normalize_name(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Unit> {
        self.units.get_mut(units::normalize_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    fn lookup(&self, name: &str) -> Result<&Unit, ManagerError> {
        self.get(name)
            .ok_or_else(|| ManagerError::UnitNotFound(name.to_string()))
    }

    pub fn start_service(&self, name: &str) -> Result<ExecResult, ManagerError> {
        Ok(self.lookup(name)?.start()?)
    }

    pub fn stop_service(&self, name: &str) -> Result<ExecResult, ManagerError> {
        Ok(self.lookup(name)?.stop()?)
    }

    pub fn restart_service(&self, name: &str) -> Result<ExecResult, ManagerError> {
        Ok(self.lookup(name)?.restart()?)
    }

    pub fn enable_service(&self, name: &str) -> Result<ExecResult, ManagerError> {
        Ok(self.lookup(name)?.enable()?)
    }

    pub fn disable_service(&self, name: &str) -> Result<ExecResult, ManagerError> {
        Ok(self.lookup(name)?.disable()?)
    }

    pub fn load_service(&self, name: &str) -> Result<ExecResult, ManagerError> {
        Ok(self.lookup(name)?.load()?)
    }

    pub fn unload_service(&self, name: &str) -> Result<ExecResult, ManagerError> {
        Ok(self.lookup(name)?.unload()?)
    }

    pub fn reload_service(&self, name: &str) -> Result<ExecResult, ManagerError> {
        Ok(self.lookup(name)?.reload_unit()?)
    }

    pub fn status_service(&self, name: &str) -> Result<ExecResult, ManagerError> {
        Ok(self.lookup(name)?.status()?)
    }

    pub fn info(&self, name: &str) -> Result<UnitInfo, ManagerError> {
        Ok(self.lookup(name)?.info())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::fake::RecordingShell;
    use crate::units::fake::MemoryFs;
    use std::path::PathBuf;
    use std::sync::Arc;

    const ROOT: &str = "/etc/systemd/system";

    fn setup() -> (Arc<RecordingShell>, Arc<MemoryFs>, UnitOptions) {
        let shell = Arc::new(RecordingShell::new());
        let fs = Arc::new(MemoryFs::with_dir(ROOT));
        let opts = UnitOptions {
            install_root: PathBuf::from(ROOT),
            shell: shell.clone(),
            fs: fs.clone(),
            ..UnitOptions::default()
        };
        (shell, fs, opts)
    }

    fn record(name: &str) -> ServiceConfig {
        ServiceConfig {
            name: name.into(),
            exec_start: Some(format!("/usr/bin/{}", name)),
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn test_add_and_get() {
        let (_, _, opts) = setup();
        let mut manager = UnitManager::new();
        assert!(manager.is_empty());

        manager.add(Unit::with_options("web", &opts).unwrap());

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.get("web").map(Unit::name), Some("web"));
        assert_eq!(manager.get("web.service").map(Unit::name), Some("web"));
        assert!(manager.get("missing").is_none());
        assert!(manager.contains("web"));
    }

    #[test]
    fn test_add_overwrites() {
        let (_, _, opts) = setup();
        let mut manager = UnitManager::new();

        let mut first = Unit::with_options("web", &opts).unwrap();
        first.description = "first".into();
        let mut second = Unit::with_options("web", &opts).unwrap();
        second.description = "second".into();

        manager.add(first);
        manager.add(second);

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.get("web").unwrap().description, "second");
    }

    #[test]
    fn test_keys_match_unit_names() {
        let (_, _, opts) = setup();
        let manager =
            UnitManager::from_records(&[record("b"), record("a"), record("c")], &opts).unwrap();

        for (key, unit) in manager.names().zip(manager.units()) {
            assert_eq!(key, unit.name());
        }
        assert_eq!(manager.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_missing_unit_errors() {
        let (shell, _, opts) = setup();
        let manager = UnitManager::from_records(&[record("web")], &opts).unwrap();

        let results = [
            manager.start_service("missing"),
            manager.stop_service("missing"),
            manager.restart_service("missing"),
            manager.enable_service("missing"),
            manager.disable_service("missing"),
            manager.load_service("missing"),
            manager.unload_service("missing"),
            manager.reload_service("missing"),
            manager.status_service("missing"),
        ];
        for result in results {
            assert!(matches!(result, Err(ManagerError::UnitNotFound(n)) if n == "missing"));
        }
        assert!(matches!(manager.info("missing"), Err(ManagerError::UnitNotFound(_))));
        assert!(shell.calls().is_empty());
    }

    #[test]
    fn test_per_name_delegates() {
        let (shell, _, opts) = setup();
        let manager = UnitManager::from_records(&[record("web")], &opts).unwrap();

        manager.stop_service("web").unwrap();
        manager.enable_service("web.service").unwrap();
        manager.disable_service("web").unwrap();
        manager.restart_service("web").unwrap();

        assert_eq!(
            shell.calls(),
            vec![
                "sudo systemctl stop web.service",
                "sudo systemctl enable web.service",
                "sudo systemctl disable web.service",
                "sudo systemctl restart web.service",
            ]
        );
    }

    #[test]
    fn test_unit_errors_propagate_unchanged() {
        let (_, fs, opts) = setup();
        let manager = UnitManager::from_records(&[record("web")], &opts).unwrap();

        let err = manager.unload_service("web").unwrap_err();
        assert!(matches!(err, ManagerError::Unit(UnitError::NotLoaded(_))));

        fs.add_file(PathBuf::from(ROOT).join("web.service"), "[Unit]\n");
        let err = manager.load_service("web").unwrap_err();
        assert!(matches!(err, ManagerError::Unit(UnitError::AlreadyLoaded(_))));
        assert_eq!(err.to_string(), "Unit already loaded: /etc/systemd/system/web.service");
    }

    #[test]
    fn test_invalid_record_name() {
        let (_, _, opts) = setup();
        let result = UnitManager::from_records(&[record("ok"), record("")], &opts);
        assert!(matches!(result, Err(ManagerError::Unit(UnitError::InvalidName(_)))));
    }

    #[test]
    fn test_from_config_applies_settings() {
        let (_, _, opts) = setup();
        let config = Config::from_yaml(
            "settings:\n  dry_run: true\n  install_root: /run/systemd/system\nservices:\n  - name: web\n",
        )
        .unwrap();

        let manager = UnitManager::from_config(&config, opts).unwrap();
        let unit = manager.get("web").unwrap();
        assert!(unit.dry_run);
        assert_eq!(unit.install_root(), Path::new("/run/systemd/system"));
    }
}
