//! OS Quota CLI (osquota)

use anyhow::Result;
use clap::{Parser, Subcommand};
use os_quota_types::{QuotaDomain, ReconcileFailure};
use osquota::commands::{
    parse_quota_pairs, ApplyCommand, CloudArgs, FieldsCommand, ResetCommand, RunCommand,
    ShowCommand,
};
use osquota::context::CliContext;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "osquota")]
#[command(about = "OpenStack project quota management CLI")]
#[command(version)]
#[command(long_about = "
OpenStack project quota management CLI

Reconciles compute (nova), network (neutron) and volume (cinder) quotas of a
project against the values given on the command line or in a task file.
Results are printed as JSON.

Examples:
  osquota apply compute --project demo --set instances=33 --set cores=33
  osquota apply volume --project demo --set volumes=20 --check
  osquota reset network --project demo
  osquota show compute --project demo --cloud mycloud
  osquota fields volume
  osquota run quota-task.yaml
")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set quota overrides on a project
    Apply {
        /// Quota domain (compute, network, volume)
        domain: QuotaDomain,

        /// Project name or ID
        #[arg(short, long)]
        project: String,

        /// Quota value as key=value, repeatable
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Report what would change without writing
        #[arg(long)]
        check: bool,

        #[command(flatten)]
        cloud: CloudArgs,
    },

    /// Reset a project's quotas to the defaults
    Reset {
        /// Quota domain (compute, network, volume)
        domain: QuotaDomain,

        /// Project name or ID
        #[arg(short, long)]
        project: String,

        /// Report what would change without deleting
        #[arg(long)]
        check: bool,

        #[command(flatten)]
        cloud: CloudArgs,
    },

    /// Show a project's current quotas
    Show {
        /// Quota domain (compute, network, volume)
        domain: QuotaDomain,

        /// Project name or ID
        #[arg(short, long)]
        project: String,

        #[command(flatten)]
        cloud: CloudArgs,
    },

    /// List recognized quota fields and their defaults
    Fields {
        /// Only list this domain
        domain: Option<QuotaDomain>,
    },

    /// Run a task file (YAML, TOML or JSON)
    Run {
        /// Task file path
        task: String,

        /// Force check mode
        #[arg(long)]
        check: bool,
    },
}

async fn execute(command: Commands) -> Result<Value> {
    let value = match command {
        Commands::Apply {
            domain,
            project,
            set,
            check,
            cloud,
        } => {
            let quota = parse_quota_pairs(&set)?;
            let context = CliContext::bootstrap(&cloud.to_config(), check).await?;
            let outcome = ApplyCommand::new(context)
                .execute(domain, &project, quota)
                .await?;
            serde_json::to_value(outcome)?
        }

        Commands::Reset {
            domain,
            project,
            check,
            cloud,
        } => {
            let context = CliContext::bootstrap(&cloud.to_config(), check).await?;
            let outcome = ResetCommand::new(context).execute(domain, &project).await?;
            serde_json::to_value(outcome)?
        }

        Commands::Show {
            domain,
            project,
            cloud,
        } => {
            let context = CliContext::bootstrap(&cloud.to_config(), false).await?;
            let outcome = ShowCommand::new(context).execute(domain, &project).await?;
            serde_json::to_value(outcome)?
        }

        Commands::Fields { domain } => serde_json::to_value(FieldsCommand::new().execute(domain))?,

        Commands::Run { task, check } => {
            let outcome = RunCommand::new(check).execute(&task).await?;
            serde_json::to_value(outcome)?
        }
    };
    Ok(value)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match execute(cli.command).await {
        Ok(value) => {
            println!("{}", value);
            std::process::exit(0);
        }
        Err(e) => {
            log::debug!("Command failed: {:?}", e);
            let failure = ReconcileFailure::new(format!("{:#}", e));
            let json = serde_json::to_string(&failure).unwrap_or_else(|_| failure.msg.clone());
            println!("{}", json);
            std::process::exit(1);
        }
    }
}
