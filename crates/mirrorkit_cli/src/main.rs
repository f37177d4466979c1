use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use mirrorkit_io_fs::{CopyOrchestrator, EnumCopyFailureRule, RegistryPaths, SpecRunConfig};
use mirrorkit_log::SinkConsole;
use mirrorkit_manifest::{SpecManifest, run_pipeline};
use tracing_subscriber::{EnvFilter, filter::LevelFilter, util::SubscriberInitExt};

/// Mirror files between directories using path patterns.
///
/// Source forms: `dir/**` (whole tree), `dir/*` or `dir/` (direct children),
/// `dir/**.ext` / `dir/*.ext` (with extension filter), or one file.
#[derive(Parser)]
#[command(name = "mirrorkit", author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    flags: FlagsRun,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FlagsRun {
    /// Report what would be copied without touching the filesystem
    #[arg(long, global = true)]
    dry_run: bool,

    /// Print every copied pair and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also carry timestamps and extended attributes
    #[arg(long, global = true)]
    keep_metadata: bool,

    /// Stop at the first failed copy instead of continuing
    #[arg(long, global = true)]
    abort_on_error: bool,

    /// Prefix stripped from paths in console output
    #[arg(long, global = true)]
    base_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy SOURCE to DESTINATION
    Copy {
        source: String,
        destination: String,
    },
    /// Check that SOURCE resolves and print the predicted destinations
    Verify {
        source: String,
        destination: String,
    },
    /// Verify and run every task of a TOML manifest
    Run {
        #[arg(default_value = "mirrorkit.toml")]
        manifest: PathBuf,
    },
}

impl FlagsRun {
    /// Flags set on the command line win over `spec_cfg`.
    fn apply(&self, mut spec_cfg: SpecRunConfig) -> SpecRunConfig {
        spec_cfg.if_dry_run |= self.dry_run;
        spec_cfg.if_verbose |= self.verbose;
        spec_cfg.if_keep_metadata |= self.keep_metadata;
        if self.abort_on_error {
            spec_cfg.rule_on_failure = EnumCopyFailureRule::Abort;
        }
        if let Some(path_base) = &self.base_path {
            spec_cfg.path_base = Some(path_base.clone());
        }
        spec_cfg
    }
}

fn init_tracing(if_verbose: bool) -> anyhow::Result<()> {
    let default_filter = if if_verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_filter.into())
        .from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .finish()
        .try_init()?;
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.flags.verbose)?;

    let sink = SinkConsole;
    let b_success = match &cli.command {
        Commands::Copy {
            source,
            destination,
        } => {
            let spec_cfg = cli.flags.apply(SpecRunConfig::default());
            let orchestrator = CopyOrchestrator::new(spec_cfg, &sink);
            match orchestrator.run(source, destination) {
                Ok(report) => {
                    println!("{report}");
                    report.is_success()
                }
                Err(e) => {
                    tracing::debug!(error = ?e, "copy failed");
                    false
                }
            }
        }
        Commands::Verify {
            source,
            destination,
        } => {
            let spec_cfg = cli.flags.apply(SpecRunConfig::default());
            let orchestrator = CopyOrchestrator::new(spec_cfg, &sink);
            let mut registry = RegistryPaths::new();
            match orchestrator.verify_report(source, destination, &mut registry) {
                Ok(report) => {
                    for spec_pair in &report.pairs {
                        println!(
                            "{} -> {}",
                            orchestrator.config().display_path(&spec_pair.path_file_src),
                            orchestrator.config().display_path(&spec_pair.path_file_dst)
                        );
                    }
                    println!("{}", report.format("[VERIFY]"));
                    true
                }
                Err(e) => {
                    tracing::debug!(error = ?e, "verify failed");
                    false
                }
            }
        }
        Commands::Run { manifest } => {
            let spec_manifest = SpecManifest::load(manifest)?;
            let spec_cfg = cli.flags.apply(spec_manifest.to_run_config());
            let report_pipeline = run_pipeline(&spec_manifest, &spec_cfg, &sink);
            println!("{report_pipeline}");
            report_pipeline.is_success()
        }
    };

    Ok(if b_success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use mirrorkit_io_fs::{EnumCopyFailureRule, SpecRunConfig};

    use super::{Cli, Commands};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "mirrorkit",
            "copy",
            "src/**",
            "dist/",
            "--dry-run",
            "--abort-on-error",
        ])
        .expect("parse");
        assert!(matches!(cli.command, Commands::Copy { .. }));

        let spec_cfg = cli.flags.apply(SpecRunConfig {
            if_verbose: true,
            ..SpecRunConfig::default()
        });
        assert!(spec_cfg.if_dry_run);
        assert!(spec_cfg.if_verbose);
        assert_eq!(spec_cfg.rule_on_failure, EnumCopyFailureRule::Abort);
    }

    #[test]
    fn run_defaults_manifest_name() {
        let cli = Cli::try_parse_from(["mirrorkit", "run"]).expect("parse");
        match cli.command {
            Commands::Run { manifest } => assert_eq!(manifest.to_str(), Some("mirrorkit.toml")),
            _ => panic!("expected run"),
        }
    }
}
