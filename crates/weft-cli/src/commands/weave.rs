//! `weft weave`: Weave a batch of modules.

use std::path::PathBuf;

use anyhow::Context;
use termcolor::ColorChoice;
use weft_weaver::{BatchRequest, Weaver};

use crate::output::StyledOutput;

/// Arguments of `weft weave`
pub struct WeaveArgs {
    pub output: PathBuf,
    pub references: Vec<String>,
    pub targets: Vec<String>,
    pub config: Option<PathBuf>,
    pub glue_suffix: Option<String>,
    pub no_symbols: bool,
    pub color: ColorChoice,
}

pub fn execute(args: WeaveArgs) -> anyhow::Result<()> {
    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(suffix) = args.glue_suffix {
        config.glue_suffix = suffix;
    }
    if args.no_symbols {
        config.read_symbols = false;
    }

    let request = BatchRequest {
        references: args.references,
        targets: args.targets,
        output_dir: args.output,
    };

    let report = Weaver::with_config(config)
        .run(&request)
        .with_context(|| format!("Weaving into {} failed", request.output_dir.display()))?;

    let mut out = StyledOutput::new(args.color);
    for name in &report.load_order {
        out.success("  woven ");
        out.plain(name);
        out.newline();
    }
    for name in &report.skipped {
        out.warning("skipped ");
        out.plain(name);
        out.dim(" (glue)");
        out.newline();
    }
    out.bold(&format!(
        "{} modules woven, {} files written to {}",
        report.load_order.len(),
        report.outputs.len() + 1,
        request.output_dir.display()
    ));
    out.newline();
    out.flush();

    Ok(())
}
