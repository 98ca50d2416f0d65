//! Logger setup
//!
//! The default level is `warn`. Each `-v` raises it one step. `RUST_LOG`,
//! when set, replaces the level entirely:
//!
//! ```bash
//! RUST_LOG=weft_weaver::order=debug weft weave --output woven bin/Game.wbc
//! ```

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Level selected by the number of `-v` flags
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global logger
pub fn init(verbosity: u8) {
    let env = Env::default().default_filter_or(level_for(verbosity).as_str());
    let mut builder = Builder::from_env(env);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{:5}] {} - {}",
            record.level(),
            record.target(),
            record.args()
        )
    });
    let _ = builder.try_init();
}
