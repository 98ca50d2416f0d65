//! `weft inspect`: Show how a module's types are classified.

use std::path::PathBuf;

use anyhow::Context;
use termcolor::ColorChoice;
use weft_bytecode::{flags, Module};
use weft_weaver::classify;

use crate::output::StyledOutput;

pub fn execute(path: PathBuf, config: Option<PathBuf>, color: ColorChoice) -> anyhow::Result<()> {
    let config = super::load_config(config.as_deref())?;
    let module = Module::read_from(&path)
        .with_context(|| format!("Failed to read module {}", path.display()))?;

    let mut out = StyledOutput::new(color);
    out.bold(&module.identity.to_string());
    if module.has_flag(flags::WOVEN) {
        out.dim(" (woven)");
    }
    out.newline();

    for ty in &module.types {
        match classify(ty, &config.reflection) {
            Some(category) => out.info(&format!("  {:<18}", category.as_str())),
            None => out.dim(&format!("  {:<18}", "-")),
        }
        out.plain(&ty.full_name());
        out.newline();
    }
    out.flush();

    Ok(())
}
