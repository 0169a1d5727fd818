//! Per-unit commands

use super::{report, Context};

#[derive(Debug, Clone, Copy)]
pub enum UnitAction {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
    Load,
    Unload,
    Reload,
    Status,
}

impl UnitAction {
    fn verb(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Load => "load",
            Self::Unload => "unload",
            Self::Reload => "reload",
            Self::Status => "status",
        }
    }
}

pub fn unit(ctx: &Context, name: &str, action: UnitAction) -> Result<(), Box<dyn std::error::Error>> {
    let manager = &ctx.manager;
    let result = match action {
        UnitAction::Start => manager.start_service(name)?,
        UnitAction::Stop => manager.stop_service(name)?,
        UnitAction::Restart => manager.restart_service(name)?,
        UnitAction::Enable => manager.enable_service(name)?,
        UnitAction::Disable => manager.disable_service(name)?,
        UnitAction::Load => manager.load_service(name)?,
        UnitAction::Unload => manager.unload_service(name)?,
        UnitAction::Reload => manager.reload_service(name)?,
        UnitAction::Status => {
            // systemctl status exits non-zero for inactive units
            let result = manager.status_service(name)?;
            if !result.stdout.is_empty() {
                println!("{}", result.stdout);
            }
            return Ok(());
        }
    };

    report(action.verb(), name, &result)
}

pub fn info(ctx: &Context, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let info = ctx.manager.info(name)?;
    print!("{}", serde_yaml::to_string(&info)?);
    Ok(())
}

pub fn generate(ctx: &Context, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let unit = ctx
        .manager
        .get(name)
        .ok_or_else(|| sysinit::ManagerError::UnitNotFound(name.to_string()))?;
    print!("{}", unit.generate_descriptor()?);
    Ok(())
}
