//! gst-portal — look up GST registrations behind the portal's captcha.

mod output;

use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use gst_portal::{build_solver, Gstin, Pan, PanLookup, PortalConfig, SolverConfig, Workflow};

#[derive(Parser)]
#[command(
    name = "gst-portal",
    about = "Resolve a PAN to its GSTINs and fetch registration and return-filing records",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Portal root URL. Also reads GST_PORTAL_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Captcha answer to submit instead of prompting.
    #[arg(long, global = true)]
    captcha: Option<String>,

    /// Where to save the captcha image for manual solving.
    #[arg(long, global = true)]
    captcha_path: Option<PathBuf>,

    /// Request timeout in seconds. Also reads GST_PORTAL_TIMEOUT_SECS.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the GSTINs registered under a PAN.
    Pan {
        /// Taxpayer PAN, e.g. AABFS0153K.
        pan: String,
    },

    /// Resolve a PAN and fetch everything for its first GSTIN.
    Lookup {
        /// Taxpayer PAN, e.g. AABFS0153K.
        pan: String,

        /// Directory for the <gstin>_complete_data.json file.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Print the full record as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Fetch everything for a known GSTIN.
    Gstin {
        /// Registration identifier, e.g. 27AAAAA0000A1Z5.
        gstin: String,

        /// Directory for the <gstin>_complete_data.json file.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Print the full record as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    ///
    /// Example:
    ///   gst-portal completions bash > ~/.local/share/bash-completion/completions/gst-portal
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

impl Cli {
    fn portal_config(&self) -> anyhow::Result<PortalConfig> {
        let mut config = PortalConfig::from_env()?;
        if let Some(url) = &self.base_url {
            config.base_url = url.parse()?;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(path) = &self.captcha_path {
            config.captcha_path = path.clone();
        }
        Ok(config)
    }

    fn solver_config(&self) -> SolverConfig {
        match &self.captcha {
            Some(answer) => SolverConfig::Fixed(answer.clone()),
            None => SolverConfig::Console,
        }
    }

    fn workflow(&self) -> anyhow::Result<Workflow> {
        let config = self.portal_config()?;
        let solver = build_solver(&self.solver_config(), config.captcha_path.clone());
        Ok(Workflow::new(config, solver)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Pan { pan } => {
            let pan: Pan = pan.parse()?;
            let mut workflow = cli.workflow()?;
            let resolution = workflow.resolve_pan(&pan).await?;
            output::print_candidates(&resolution);
        }

        Commands::Lookup {
            pan,
            output: dir,
            json,
        } => {
            let pan: Pan = pan.parse()?;
            let mut workflow = cli.workflow()?;
            match workflow.lookup(&pan).await? {
                PanLookup::NotRegistered(_) => println!("No GSTIN details found."),
                PanLookup::Found { candidate, record } => {
                    output::print_candidate(&candidate);
                    output::emit_record(&candidate.gstin, &record, dir, *json)?;
                }
            }
        }

        Commands::Gstin {
            gstin,
            output: dir,
            json,
        } => {
            let gstin: Gstin = gstin.parse()?;
            let mut workflow = cli.workflow()?;
            let record = workflow.fetch_complete(&gstin).await?;
            output::emit_record(gstin.as_str(), &record, dir, *json)?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "gst-portal", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_captcha_flag_selects_fixed_solver() {
        let cli = Cli::parse_from(["gst-portal", "--captcha", "AB12", "pan", "AABFS0153K"]);
        assert_eq!(cli.solver_config(), SolverConfig::Fixed("AB12".to_string()));

        let cli = Cli::parse_from(["gst-portal", "pan", "AABFS0153K"]);
        assert_eq!(cli.solver_config(), SolverConfig::Console);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "gst-portal",
            "gstin",
            "27AAAAA0000A1Z5",
            "--base-url",
            "http://127.0.0.1:9000",
            "--timeout-secs",
            "15",
            "--captcha-path",
            "/tmp/c.png",
        ]);
        let config = cli.portal_config().unwrap();
        assert_eq!(config.origin(), "http://127.0.0.1:9000");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.captcha_path, PathBuf::from("/tmp/c.png"));
    }
}
