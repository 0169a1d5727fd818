//! A single service unit and its lifecycle
//!
//! Unit state is never stored. Whether a unit is loaded is a filesystem
//! check on its descriptor path; enabled/active are asked of `systemctl`
//! every time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::descriptor::{self, Section};
use super::fs::{HostFs, UnitFs};
use super::{
    UnitError, DEFAULT_INSTALL_ROOT, DEFAULT_SERVICE_TYPE, DEFAULT_WANTED_BY, SYSTEMCTL,
    UNIT_EXTENSION,
};
use crate::config::{Environment, ServiceConfig, Settings};
use crate::exec::{CommandSpec, Elevation, ExecResult, Executor, Shell, SystemShell};

/// How units are executed and where their descriptors live
#[derive(Clone)]
pub struct UnitOptions {
    pub install_root: PathBuf,
    pub dry_run: bool,
    pub verbose: bool,
    pub elevation: Elevation,
    pub shell: Arc<dyn Shell>,
    pub fs: Arc<dyn UnitFs>,
}

impl Default for UnitOptions {
    fn default() -> Self {
        Self {
            install_root: PathBuf::from(DEFAULT_INSTALL_ROOT),
            dry_run: false,
            verbose: false,
            elevation: Elevation::default(),
            shell: Arc::new(SystemShell),
            fs: Arc::new(HostFs),
        }
    }
}

impl std::fmt::Debug for UnitOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOptions")
            .field("install_root", &self.install_root)
            .field("dry_run", &self.dry_run)
            .field("verbose", &self.verbose)
            .field("elevation", &self.elevation)
            .finish_non_exhaustive()
    }
}

impl UnitOptions {
    /// Overlay config-file settings; flags already set stay set
    pub fn apply_settings(mut self, settings: &Settings) -> Self {
        if let Some(root) = &settings.install_root {
            self.install_root = root.clone();
        }
        if let Some(elevation) = settings.elevation {
            self.elevation = elevation;
        }
        self.dry_run |= settings.dry_run;
        self.verbose |= settings.verbose;
        self
    }
}

/// Snapshot of a unit's configuration plus its live state
#[derive(Debug, Clone, Serialize)]
pub struct UnitInfo {
    #[serde(flatten)]
    pub config: ServiceConfig,
    pub descriptor_path: PathBuf,
    pub dry_run: bool,
    pub loaded: bool,
    pub enabled: bool,
    pub active: bool,
}

/// One manageable `.service` descriptor
#[derive(Clone)]
pub struct Unit {
    name: String,
    pub description: String,
    pub exec_start: Option<CommandSpec>,
    pub exec_stop: Option<CommandSpec>,
    pub working_directory: Option<String>,
    pub restart: Option<String>,
    pub user: Option<String>,
    pub environment: Environment,
    pub wanted_by: String,
    pub after: Option<String>,
    pub requires: Option<String>,
    pub service_type: String,
    pub dry_run: bool,
    pub verbose: bool,
    install_root: PathBuf,
    elevation: Elevation,
    shell: Arc<dyn Shell>,
    fs: Arc<dyn UnitFs>,
}

impl std::fmt::Debug for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unit")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("exec_start", &self.exec_start)
            .field("exec_stop", &self.exec_stop)
            .field("service_type", &self.service_type)
            .field("install_root", &self.install_root)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

fn validate_name(name: &str) -> Result<(), UnitError> {
    if name.is_empty() || name.contains('/') || name.chars().any(char::is_whitespace) {
        return Err(UnitError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Descriptor values are line-oriented; a line break would start a new key
fn single_line(unit: &str, field: &str, value: &str) -> Result<(), UnitError> {
    if value.contains(['\n', '\r']) {
        return Err(UnitError::InvalidValue {
            unit: unit.to_string(),
            field: field.to_string(),
        });
    }
    Ok(())
}

fn quote(s: &str, unit: &str) -> Result<String, UnitError> {
    shlex::try_quote(s)
        .map(|q| q.into_owned())
        .map_err(|_| UnitError::Quote(unit.to_string()))
}

impl Unit {
    /// A unit with default settings, executing on the local host
    pub fn new(name: impl Into<String>) -> Result<Self, UnitError> {
        Self::with_options(name, &UnitOptions::default())
    }

    pub fn with_options(name: impl Into<String>, options: &UnitOptions) -> Result<Self, UnitError> {
        let name = name.into();
        let name = super::normalize_name(&name).to_string();
        validate_name(&name)?;

        Ok(Self {
            name,
            description: String::new(),
            exec_start: None,
            exec_stop: None,
            working_directory: None,
            restart: None,
            user: None,
            environment: Environment::new(),
            wanted_by: DEFAULT_WANTED_BY.to_string(),
            after: None,
            requires: None,
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
            dry_run: options.dry_run,
            verbose: options.verbose,
            install_root: options.install_root.clone(),
            elevation: options.elevation,
            shell: options.shell.clone(),
            fs: options.fs.clone(),
        })
    }

    /// Build a unit from a configuration record
    pub fn from_config(record: &ServiceConfig, options: &UnitOptions) -> Result<Self, UnitError> {
        let mut unit = Self::with_options(record.name.clone(), options)?;

        unit.description = record.description.clone().unwrap_or_default();
        unit.exec_start = record
            .exec_start
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(CommandSpec::new);
        unit.exec_stop = record
            .exec_stop
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(CommandSpec::new);
        unit.working_directory = record.working_directory.clone();
        unit.restart = record.restart.clone();
        unit.user = record.user.clone();
        unit.environment = record.environment.clone();
        if let Some(wanted_by) = &record.wanted_by {
            unit.wanted_by = wanted_by.clone();
        }
        unit.after = record.after.clone();
        unit.requires = record.requires.clone();
        if let Some(t) = record.service_type.as_deref().filter(|t| !t.is_empty()) {
            unit.service_type = t.to_string();
        }

        unit.validate()?;
        Ok(unit)
    }

    /// Parse an existing descriptor file
    ///
    /// The unit name comes from the file name, not the content.
    /// `Environment=` lines are not reconstructed.
    pub fn from_descriptor_file(path: &Path, options: &UnitOptions) -> Result<Self, UnitError> {
        let content = options
            .fs
            .read_to_string(path)
            .map_err(|source| UnitError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let parsed = descriptor::parse_flat(&content);
        if parsed.is_empty() {
            return Err(UnitError::InvalidDescriptor(path.to_path_buf()));
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| UnitError::InvalidName(path.display().to_string()))?;

        let field = |key: &str| parsed.get(key).cloned();
        let record = ServiceConfig {
            name: name.to_string(),
            description: field("description"),
            exec_start: field("execstart"),
            exec_stop: field("execstop"),
            working_directory: field("workingdirectory"),
            restart: field("restart"),
            user: field("user"),
            environment: Environment::new(),
            wanted_by: field("wantedby"),
            after: field("after"),
            requires: field("requires"),
            service_type: field("type"),
        };

        Self::from_config(&record, options)
    }

    /// Convert back into a configuration record
    pub fn to_config(&self) -> ServiceConfig {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        ServiceConfig {
            name: self.name.clone(),
            description: non_empty(&self.description),
            exec_start: self.exec_start.as_ref().map(|c| c.command_line.clone()),
            exec_stop: self.exec_stop.as_ref().map(|c| c.command_line.clone()),
            working_directory: self.working_directory.clone(),
            restart: self.restart.clone(),
            user: self.user.clone(),
            environment: self.environment.clone(),
            wanted_by: non_empty(&self.wanted_by),
            after: self.after.clone(),
            requires: self.requires.clone(),
            service_type: non_empty(&self.service_type),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// `<name>.service`
    pub fn service_file_name(&self) -> String {
        format!("{}.{}", self.name, UNIT_EXTENSION)
    }

    /// Absolute path of the installed descriptor
    pub fn descriptor_path(&self) -> PathBuf {
        self.install_root.join(self.service_file_name())
    }

    fn executor(&self) -> Executor {
        Executor::new(self.shell.clone())
            .with_elevation(self.elevation)
            .with_dry_run(self.dry_run)
            .with_verbose(self.verbose)
    }

    fn systemctl(&self, verb: &str) -> CommandSpec {
        CommandSpec::new(format!("{} {} {}", SYSTEMCTL, verb, self.service_file_name()))
    }

    fn control(&self, verb: &str, action: &str) -> Result<ExecResult, UnitError> {
        let spec = self
            .systemctl(verb)
            .elevated()
            .describe(format!("{}: {} service", action, self.name));
        Ok(self.executor().execute(&spec)?)
    }

    fn query(&self, verb: &str, expected: &str) -> bool {
        let spec = self
            .systemctl(verb)
            .describe(format!("Checking {}: {}", verb, self.name));
        match self.executor().execute(&spec) {
            Ok(result) => result.stdout.trim() == expected,
            Err(e) => {
                log::warn!("{} query for {} failed: {}", verb, self.name, e);
                false
            }
        }
    }

    /// Check that every value renders onto a single descriptor line
    pub fn validate(&self) -> Result<(), UnitError> {
        let fields = [
            ("Description", Some(self.description.as_str())),
            ("After", self.after.as_deref()),
            ("Requires", self.requires.as_deref()),
            ("Type", Some(self.service_type.as_str())),
            ("WorkingDirectory", self.working_directory.as_deref()),
            ("ExecStart", self.exec_start.as_ref().map(|c| c.command_line.as_str())),
            ("ExecStop", self.exec_stop.as_ref().map(|c| c.command_line.as_str())),
            ("Restart", self.restart.as_deref()),
            ("User", self.user.as_deref()),
            ("WantedBy", Some(self.wanted_by.as_str())),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                single_line(&self.name, field, value)?;
            }
        }
        for (key, value) in self.environment.iter() {
            single_line(&self.name, "Environment", key)?;
            single_line(&self.name, "Environment", value)?;
        }
        Ok(())
    }

    /// Render the descriptor text
    pub fn generate_descriptor(&self) -> Result<String, UnitError> {
        self.validate()?;

        let mut unit = Section::new("Unit");
        let description = if self.description.is_empty() {
            &self.name
        } else {
            &self.description
        };
        unit.push("Description", description.as_str());
        unit.push_opt("After", self.after.as_deref());
        unit.push_opt("Requires", self.requires.as_deref());

        let mut service = Section::new("Service");
        service.push("Type", self.service_type.as_str());
        service.push_opt("WorkingDirectory", self.working_directory.as_deref());
        service.push_opt(
            "ExecStart",
            self.exec_start.as_ref().map(|c| c.command_line.as_str()),
        );
        service.push_opt(
            "ExecStop",
            self.exec_stop.as_ref().map(|c| c.command_line.as_str()),
        );
        service.push_opt("Restart", self.restart.as_deref());
        service.push_opt("User", self.user.as_deref());
        for (key, value) in self.environment.iter() {
            service.push("Environment", format!("{}={}", key, value));
        }

        let mut install = Section::new("Install");
        install.push("WantedBy", self.wanted_by.as_str());

        Ok(descriptor::render(&[unit, service, install]))
    }

    /// Descriptor file exists at the install path
    pub fn is_loaded(&self) -> bool {
        self.fs.exists(&self.descriptor_path())
    }

    pub fn is_enabled(&self) -> bool {
        self.query("is-enabled", "enabled")
    }

    pub fn is_active(&self) -> bool {
        self.query("is-active", "active")
    }

    /// Write the descriptor into `directory`
    pub fn to_file(&self, directory: &Path) -> Result<ExecResult, UnitError> {
        if !self.fs.is_dir(directory) {
            return Err(UnitError::PathNotFound(directory.to_path_buf()));
        }

        let path = directory.join(self.service_file_name());
        let pipeline = format!(
            "printf '%s' {} | tee {} > /dev/null",
            quote(&self.generate_descriptor()?, &self.name)?,
            quote(&path.to_string_lossy(), &self.name)?,
        );
        let spec = CommandSpec::new(format!("sh -c {}", quote(&pipeline, &self.name)?))
            .elevated()
            .describe(format!(
                "Writing service file for {} to {}",
                self.name,
                directory.display()
            ));

        Ok(self.executor().execute(&spec)?)
    }

    /// Install the descriptor; fails if it is already there
    pub fn load(&self) -> Result<ExecResult, UnitError> {
        if self.is_loaded() {
            return Err(UnitError::AlreadyLoaded(self.descriptor_path()));
        }
        self.to_file(&self.install_root)
    }

    /// Delete the installed descriptor
    pub fn unload(&self) -> Result<ExecResult, UnitError> {
        if !self.is_loaded() {
            return Err(UnitError::NotLoaded(self.name.clone()));
        }

        let path = self.descriptor_path();
        let spec = CommandSpec::new(format!("rm {}", quote(&path.to_string_lossy(), &self.name)?))
            .elevated()
            .describe(format!("Removing service: {}", self.name));
        Ok(self.executor().execute(&spec)?)
    }

    pub fn daemon_reload(&self) -> Result<ExecResult, UnitError> {
        let spec = CommandSpec::new(format!("{} daemon-reload", SYSTEMCTL))
            .elevated()
            .describe("Reloading systemd daemon");
        Ok(self.executor().execute(&spec)?)
    }

    /// Make sure the descriptor is installed, then reload the daemon
    pub fn setup(&self) -> Result<ExecResult, UnitError> {
        if !self.is_loaded() {
            self.load()?;
        }
        self.daemon_reload()
    }

    pub fn start(&self) -> Result<ExecResult, UnitError> {
        self.setup()?;
        self.control("start", "Starting")
    }

    pub fn stop(&self) -> Result<ExecResult, UnitError> {
        self.control("stop", "Stopping")
    }

    pub fn restart(&self) -> Result<ExecResult, UnitError> {
        self.control("restart", "Restarting")
    }

    pub fn status(&self) -> Result<ExecResult, UnitError> {
        self.control("status", "Status")
    }

    pub fn enable(&self) -> Result<ExecResult, UnitError> {
        self.control("enable", "Enable")
    }

    pub fn disable(&self) -> Result<ExecResult, UnitError> {
        self.control("disable", "Disable")
    }

    /// Push descriptor edits live: unload, load, daemon-reload
    pub fn reload_unit(&self) -> Result<ExecResult, UnitError> {
        self.unload()?;
        self.load()?;
        self.daemon_reload()
    }

    /// Configuration plus live loaded/enabled/active state
    pub fn info(&self) -> UnitInfo {
        UnitInfo {
            config: self.to_config(),
            descriptor_path: self.descriptor_path(),
            dry_run: self.dry_run,
            loaded: self.is_loaded(),
            enabled: self.is_enabled(),
            active: self.is_active(),
        }
    }
}
