use clap::{Args, Parser, Subcommand};
use pathlock::{Path, Preset, Safety};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pathlock-ctl")]
#[command(version, about = "Run programs with filesystem access limited by Landlock", long_about = None)]
#[command(after_help = "RULES:
    f:<mode>:<path>   a file        d:<mode>:<path>   a directory
    mode is any of r (read), w (write), c (create/remove), x (execute)

EXAMPLES:
    pathlock-ctl check
    pathlock-ctl presets
    pathlock-ctl show -P shared -p d:rwc:/tmp
    pathlock-ctl run -P shared -P stdio -p f:rx:/usr/bin/cat -p f:r:/etc/hosts -- cat /etc/hosts
    pathlock-ctl run --policy policy.json --safety try -- ./server
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report landlock support on this kernel
    Check,

    /// List presets and the paths they resolve to here
    Presets,

    /// Print the rule set a policy and flags produce
    Show {
        #[command(flatten)]
        rules: RuleArgs,
    },

    /// Lock this process, then execute a program inside the sandbox
    Run {
        #[command(flatten)]
        rules: RuleArgs,

        /// What to do when landlock is missing or fails
        #[arg(short, long, value_name = "LEVEL")]
        safety: Option<Safety>,

        /// Program to run
        #[arg(required = true)]
        program: String,

        /// Program arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Args, Clone, Default)]
pub struct RuleArgs {
    /// JSON policy file
    #[arg(long, value_name = "FILE")]
    pub policy: Option<PathBuf>,

    /// Rule in kind:mode:path form (repeatable)
    #[arg(short, long = "path", value_name = "RULE")]
    pub paths: Vec<Path>,

    /// Preset to include (repeatable)
    #[arg(short = 'P', long = "preset", value_name = "PRESET")]
    pub presets: Vec<Preset>,
}
