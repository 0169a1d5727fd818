//! List units

use super::Context;

pub fn list(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    println!("UNIT                                 LOADED  ENABLED  ACTIVE  DESCRIPTION");

    for unit in ctx.manager.units() {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        let desc = if unit.description.is_empty() {
            "-"
        } else {
            unit.description.as_str()
        };

        println!(
            "{:<36} {:<7} {:<8} {:<7} {}",
            unit.service_file_name(),
            yes_no(unit.is_loaded()),
            yes_no(unit.is_enabled()),
            yes_no(unit.is_active()),
            desc.chars().take(40).collect::<String>()
        );
    }

    println!();
    println!(
        "{} units listed ({})",
        ctx.manager.len(),
        ctx.options.install_root.display()
    );

    Ok(())
}
