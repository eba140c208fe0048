//! World Engine CLI: the `world-engine` command.

mod cli;
mod commands;
mod config;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    support::init_logging();
    let cli = Cli::parse();
    let config = support::load_config_or_exit(cli.config.as_deref());

    match cli.command {
        Commands::ProduceShotlist { script, output } => {
            commands::produce_shotlist::run(script, output)
        }

        Commands::ValidateScript { script } => commands::validate_script::run(script),

        Commands::ValidateShotlist { shotlist } => commands::validate_shotlist::run(shotlist),

        Commands::ValidateStoryDraft {
            draft,
            canon,
            out,
            json,
        } => commands::validate_story_draft::run(draft, canon, out, json),

        Commands::CanonDecide {
            shotlist,
            canon,
            policy,
        } => commands::canon_decide::run(&config, shotlist, canon, policy),

        Commands::CanonCommit {
            project,
            diff,
            episode_id,
            episode_seq,
        } => commands::canon_commit::run(&config, project, diff, episode_id, episode_seq),

        Commands::CanonReplay { project, upto } => {
            commands::canon_replay::run(&config, project, upto)
        }

        Commands::Verify => commands::verify::run(),
    }
}
