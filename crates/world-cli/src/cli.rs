use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "world-engine",
    about = "World Engine: canon-gated Script to ShotList adaptation",
    version
)]
pub struct Cli {
    /// Optional TOML config file
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Adapt a Script into a ShotList
    ProduceShotlist {
        /// Path to Script JSON
        #[arg(long)]
        script: String,

        /// Output ShotList path
        #[arg(long)]
        output: String,
    },

    /// Validate a Script against Script.v1
    ValidateScript {
        /// Path to Script JSON
        #[arg(long)]
        script: String,
    },

    /// Validate a ShotList against ShotList.v1
    ValidateShotlist {
        /// Path to ShotList JSON
        #[arg(long)]
        shotlist: String,
    },

    /// Check a Script draft against a canon snapshot
    ValidateStoryDraft {
        /// Path to draft Script JSON
        #[arg(long)]
        draft: String,

        /// Path to CanonSnapshot JSON
        #[arg(long)]
        canon: String,

        /// Write the CanonViolationReport here on failure
        #[arg(long)]
        out: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decide allow/deny for a ShotList
    CanonDecide {
        /// Path to ShotList JSON
        #[arg(long)]
        shotlist: String,

        /// Path to CanonSnapshot JSON
        #[arg(long)]
        canon: Option<String>,

        /// Path to policy JSON (list of forbidden tokens)
        #[arg(long)]
        policy: Option<String>,
    },

    /// Apply a canon diff to a project and persist it
    CanonCommit {
        /// Project identifier
        #[arg(long)]
        project: String,

        /// Path to CanonDiff JSON
        #[arg(long)]
        diff: String,

        /// Episode identifier
        #[arg(long)]
        episode_id: String,

        /// Caller-assigned episode sequence number
        #[arg(long)]
        episode_seq: u64,
    },

    /// Rebuild a project's canon from history up to an episode
    CanonReplay {
        /// Project identifier
        #[arg(long)]
        project: String,

        /// Last episode to apply
        #[arg(long)]
        upto: String,
    },

    /// Run the bundled golden-vector self-check
    Verify,
}
