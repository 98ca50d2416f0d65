//! `weft order`: Print the processing order of a batch.

use anyhow::Context;
use termcolor::ColorChoice;
use weft_weaver::{plan_batch, LoadOptions};

use crate::output::StyledOutput;

pub fn execute(
    references: Vec<String>,
    targets: Vec<String>,
    color: ColorChoice,
) -> anyhow::Result<()> {
    let config = super::load_config(None)?;
    let plan = plan_batch(&references, &targets, LoadOptions { read_symbols: false })
        .context("Failed to load the batch")?;

    let mut out = StyledOutput::new(color);
    for id in &plan.order {
        let Some(loaded) = plan.modules.get(*id) else {
            continue;
        };
        out.plain(&loaded.file_stem());
        if config.is_glue(loaded.module.name()) {
            out.dim(" (glue)");
        }
        out.newline();
    }
    out.flush();

    Ok(())
}
