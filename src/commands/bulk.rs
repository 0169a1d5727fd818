//! Operations on every registered unit

use clap::ValueEnum;

use super::Context;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BulkAction {
    Start,
    Stop,
    Restart,
    Reload,
    Load,
    Unload,
    Enable,
    Disable,
    #[value(skip)]
    KillSwitch,
}

pub fn bulk(ctx: &Context, action: BulkAction) -> Result<(), Box<dyn std::error::Error>> {
    let manager = &ctx.manager;
    let report = match action {
        BulkAction::Start => manager.start_all(),
        BulkAction::Stop => manager.stop_all(),
        BulkAction::Restart => manager.restart_all(),
        BulkAction::Reload => manager.reload_all(),
        BulkAction::Load => manager.load_all(),
        BulkAction::Unload => manager.unload_all(),
        BulkAction::Enable => manager.enable_all(),
        BulkAction::Disable => manager.disable_all(),
        BulkAction::KillSwitch => manager.kill_switch(),
    };

    let mut failed = 0;
    for (name, result) in &report.results {
        match result {
            Ok(r) if r.is_skipped() => println!("○ {:<32} skipped (dry run)", name),
            Ok(r) if r.success() => println!("● {:<32} ok", name),
            Ok(r) => {
                failed += 1;
                println!("× {:<32} exit {:?}", name, r.exit_code);
            }
            Err(e) => {
                failed += 1;
                println!("× {:<32} {}", name, e);
            }
        }
    }

    println!();
    println!("{} unit(s), {} failed", report.len(), failed);

    if failed > 0 {
        return Err(format!("{:?}: {} unit(s) failed", action, failed).into());
    }
    Ok(())
}
