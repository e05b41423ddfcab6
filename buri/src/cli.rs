use std::path::PathBuf;

use buri::commands::runner::RunnerState;
use buri_fleet::Method;
use buri_sandbox::DEFAULT_INTERPRETERS;
use clap::{Args, Parser, Subcommand};

/// Buri - keeps a CI worker's Python virtual environment up to date
#[derive(Parser, Debug)]
#[command(name = "buri")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or update the environment, pausing this machine's runners if needed
    Update(UpdateArgs),

    /// Pause (and drain) or resume the runners registered for a machine
    Runner {
        /// IP or host name of the runner machine
        #[arg(value_name = "IP")]
        ip: String,

        /// Fleet API access token
        #[arg(value_name = "TOKEN")]
        token: String,

        /// Desired state of the machine's runners
        #[arg(value_enum, value_name = "STATUS")]
        status: RunnerState,

        /// Fleet API runners URL, e.g. https://gitlab.com/api/v4/runners
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Fetch a remote resource and print its body
    Fetch {
        /// Request URL
        #[arg(value_name = "URL")]
        url: String,

        /// Request type: get or post
        #[arg(long = "request-type", alias = "method", default_value = "get")]
        method: Method,

        /// Request arguments as KEY=VALUE (query for get, form for post). Repeatable.
        #[arg(long, value_name = "KEY=VALUE")]
        data: Vec<String>,
    },

    /// Check whether a host answers a single ping (never fails)
    Ping {
        #[arg(value_name = "HOST")]
        host: String,
    },
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Base directory for the environment (default: $BURI_ROOT_DIR or /opt/ci)
    #[arg(long = "directory", alias = "root-dir", value_name = "DIR")]
    pub root_dir: Option<PathBuf>,

    /// Sub directory holding the environment (default: $BURI_SUB_DIR or buri_venv)
    #[arg(long)]
    pub sub_dir: Option<String>,

    /// Base Python interpreters to try, in order. Separate with comma.
    #[arg(long, value_delimiter = ',', default_values = DEFAULT_INTERPRETERS.iter().copied())]
    pub interpreters: Vec<String>,

    /// Requirements file or URL; empty to skip
    #[arg(long, default_value = "requirements.txt")]
    pub requirements: String,

    /// IP of the current machine (default: $BURI_MACHINE_IP)
    #[arg(long)]
    pub ip: Option<String>,

    /// Fleet API access token (default: $BURI_FLEET_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Fleet API runners URL (default: $BURI_FLEET_URL)
    #[arg(long)]
    pub url: Option<String>,

    /// Pause this machine's runners while the environment changes
    #[arg(long = "pause-runner")]
    pub pause: bool,

    /// Delete the environment directory and build it from scratch
    #[arg(long)]
    pub clear: bool,
}

impl From<UpdateArgs> for buri::commands::update::UpdateOptions {
    fn from(args: UpdateArgs) -> Self {
        Self {
            root_dir: args.root_dir,
            sub_dir: args.sub_dir,
            interpreters: args.interpreters,
            requirements: args.requirements,
            ip: args.ip,
            token: args.token,
            url: args.url,
            pause: args.pause,
            clear: args.clear,
        }
    }
}
