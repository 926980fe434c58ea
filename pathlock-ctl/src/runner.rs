use log::{debug, info};
use nix::unistd::execvp;
use pathlock::Safety;
use std::ffi::CString;

use crate::cli::RuleArgs;
use crate::commands::build_policy;

/// Configuration for a sandboxed run
pub struct RunConfig {
    pub rules: RuleArgs,
    pub safety: Option<Safety>,
    pub program: String,
    pub args: Vec<String>,
}

/// Lock this process and replace it with the program.
///
/// Only returns on failure; on success the program takes over the process.
pub fn run_locked(config: RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut policy = build_policy(config.rules)?;
    if let Some(safety) = config.safety {
        debug!("Overriding safety: {}", safety);
        policy.safety = safety;
    }

    let program = CString::new(config.program.as_str())?;
    let mut argv = vec![program.clone()];
    for arg in &config.args {
        argv.push(CString::new(arg.as_str())?);
    }

    let locker = policy.locker();
    info!("Locking with {} under {}", locker, policy.safety);
    locker.lock(policy.safety)?;

    info!("Executing: {} {:?}", config.program, config.args);
    let err = match execvp(&program, &argv) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };
    Err(format!("failed to execute {}: {}", config.program, err).into())
}
