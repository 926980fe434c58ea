use console::style;
use log::info;
use pathlock::{AccessFs, Locker, Policy, Preset, Result};

use crate::cli::RuleArgs;

/// Merge a policy file (if any) with rules given on the command line
pub fn build_policy(rules: RuleArgs) -> Result<Policy> {
    let mut policy = match &rules.policy {
        Some(file) => Policy::from_file(file)?,
        None => Policy::default(),
    };
    policy.extend(rules.presets, rules.paths);
    Ok(policy)
}

pub fn check_requirements() {
    info!("Checking landlock support");
    println!("Checking landlock support...\n");

    match pathlock::detect() {
        Ok(abi) => {
            println!("[{}] Landlock available (ABI {})", style("✓").green(), abi);
            println!("\nHandled access rights:");
            println!("  {}", AccessFs::handled(abi));
        }
        Err(err) => {
            println!("[{}] Landlock NOT available", style("✗").red());
            println!("  {}", err);
            println!("\nOnly --safety only-supported or --safety try will run here");
        }
    }
}

pub fn list_presets() {
    info!("Listing presets");
    println!("Available presets:\n");

    for preset in Preset::all() {
        let paths = preset.paths();
        println!(
            "  {:8} - {} ({} of {} present)",
            preset.name(),
            preset.description(),
            paths.len(),
            preset.members().len()
        );
        for path in paths {
            println!("             {}", style(path.to_rule_string()).dim());
        }
        println!();
    }

    println!("Use --preset <PRESET> to include a preset");
}

pub fn show(rules: RuleArgs) -> Result<()> {
    let policy = build_policy(rules)?;
    let locker: Locker = policy.locker();
    println!("{}", locker);
    Ok(())
}
