//! Parse a descriptor file and print it as a config record

use std::path::Path;

use sysinit::Unit;

use super::Context;

pub fn parse(ctx: &Context, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let unit = Unit::from_descriptor_file(path, &ctx.options)?;
    print!("{}", serde_yaml::to_string(&unit.to_config())?);
    Ok(())
}
