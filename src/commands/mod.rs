mod bulk;
mod list;
mod parse;
mod unit;

pub use bulk::{bulk, BulkAction};
pub use list::list;
pub use parse::parse;
pub use unit::{generate, info, unit, UnitAction};

use std::path::PathBuf;

use sysinit::config::Config;
use sysinit::exec::ExecResult;
use sysinit::{logging, UnitManager, UnitOptions};

/// Everything a command needs: settings, unit options and the registry
pub struct Context {
    pub options: UnitOptions,
    pub manager: UnitManager,
}

impl Context {
    pub fn new(
        config_path: Option<PathBuf>,
        dry_run: bool,
        verbose: bool,
        install_root: Option<PathBuf>,
        log_file: Option<PathBuf>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        // An explicit --config must exist; the default one is optional
        let config = match config_path {
            Some(path) => Config::load(&path)?,
            None => match Config::default_path().filter(|p| p.exists()) {
                Some(path) => Config::load(&path)?,
                None => Config::default(),
            },
        };

        let settings = &config.settings;
        let log_file = log_file.or_else(|| settings.log_file.clone());
        logging::init(verbose || settings.verbose, log_file.as_deref())?;

        let mut options = UnitOptions::default().apply_settings(settings);
        options.dry_run |= dry_run;
        options.verbose |= verbose;
        options.elevation = settings.effective_elevation();
        if let Some(root) = install_root {
            options.install_root = root;
        }

        let manager = UnitManager::from_records(&config.services, &options)?;
        log::debug!("{} unit(s) registered, options: {:?}", manager.len(), options);

        Ok(Self { options, manager })
    }
}

/// Print the outcome of one command, failing on a non-zero exit
fn report(verb: &str, name: &str, result: &ExecResult) -> Result<(), Box<dyn std::error::Error>> {
    if result.is_skipped() {
        println!("○ {} {} (dry run)", verb, name);
        return Ok(());
    }

    if !result.stdout.is_empty() {
        println!("{}", result.stdout);
    }

    if result.success() {
        println!("● {} {}", verb, name);
        Ok(())
    } else {
        Err(format!(
            "{} {} failed (exit {:?}): {}",
            verb,
            name,
            result.exit_code,
            if result.stderr.is_empty() { "no output" } else { result.stderr.as_str() }
        )
        .into())
    }
}
