use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "glpi-tools")]
#[command(about = "Query, filter and reserve computers in a GLPI instance")]
pub struct Cli {
    /// GLPI instance address (example: "127.0.0.1" or "https://glpi.example.com")
    #[arg(short, long, env = "GLPI_INSTANCE", global = true)]
    pub ip: Option<String>,

    /// GLPI user token (generated under remote access keys)
    #[arg(short, long, env = "GLPI_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Retry without certificate validation if the TLS handshake fails
    #[arg(short = 'v', long, global = true)]
    pub no_verify: bool,

    /// Config file (default: <config dir>/glpi-tools/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend reservable computers for a list of resource requirements
    Filter {
        /// YAML file of named requirements (cpu, cores, ram, gpu, nic, disks, start, end)
        #[arg(short, long)]
        list: PathBuf,

        /// List every eligible computer per requirement, skipping the weighted ranking
        #[arg(short, long)]
        all: bool,

        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },

    /// List all computers in GLPI
    Computers {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },

    /// List reservations
    Reservations {
        /// Only reservations of the machine with this exact name
        #[arg(short = 'I', long)]
        identifier: Option<String>,

        /// Only reservations made by users whose name contains this
        #[arg(short, long)]
        user: Option<String>,

        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },

    /// List reservations tagged with a project (Jira epic) id
    Project {
        /// Epic id matched against the first word of the reservation comment
        #[arg(short, long)]
        jira: String,

        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },

    /// Create reservations from a YAML reservation file
    Reserve {
        /// YAML file with username, start, end, comment, jira and servers
        #[arg(short, long)]
        list: PathBuf,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}
