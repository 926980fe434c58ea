use console::{style, StyledObject};
use env_logger::{Builder, Env};
use log::Level;
use std::io::Write;

const CRATES: [&str; 4] = ["pathlock", "pathlock_core", "pathlock_landlock", "pathlock_ctl"];

/// Initialize logger; `RUST_LOG` replaces the default filter entirely
pub fn init_logger(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));

    Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                level_label(record.level()),
                style(short_target(record.target())).dim(),
                record.args()
            )
        })
        .init();
}

/// Warnings from everything; with `-v`, debug output from our own crates only
fn default_filter(verbose: bool) -> String {
    if !verbose {
        return "warn".to_string();
    }
    let mut filter = String::from("warn");
    for name in CRATES {
        filter.push_str(&format!(",{}=debug", name));
    }
    filter
}

fn level_label(level: Level) -> StyledObject<&'static str> {
    match level {
        Level::Error => style("ERROR").red().bold(),
        Level::Warn => style("WARN ").yellow().bold(),
        Level::Info => style("INFO ").green(),
        Level::Debug => style("DEBUG").cyan(),
        Level::Trace => style("TRACE").dim(),
    }
}

/// `pathlock_landlock::locker` -> `locker`
fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}
