use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use git_semver::config::load_config;
use git_semver::git::{Git2Provider, GitProvider};
use git_semver::resolver::VersionFinder;
use git_semver::settings::Settings;

#[derive(clap::Parser)]
#[command(
    name = "git-semver",
    about = "Compute a semantic version from the commit history"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short = 'C', long, default_value = ".", help = "Repository path")]
    repo: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved version for HEAD
    Version {
        #[arg(long, help = "Include commit count and abbreviated sha")]
        info: bool,

        #[arg(long, help = "Print the four-part revision form")]
        revision: bool,
    },

    /// Print the version a release cut at HEAD would get
    Release {
        #[arg(long, help = "Pre-release label for the release; empty finalizes")]
        pre_release: Option<String>,
    },

    /// Print the commits that make up the change log
    Changelog,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let settings = Settings::from_config(&config)?;

    let provider = Git2Provider::open(&args.repo)?;
    let tags = provider.tags_by_sha()?;
    let finder = VersionFinder::new(&settings, &provider, tags);
    let head = provider.head_commit()?;

    match args.command.unwrap_or(Command::Version {
        info: false,
        revision: false,
    }) {
        Command::Version { info, revision } => {
            let is_clean = provider.is_clean()?;
            let version = finder.get_version(&head, is_clean, &settings.default_pre_release)?;
            if revision {
                println!("{}", version.to_revision_string());
            } else if info {
                println!("{}", version.to_info_version_string(7));
            } else {
                println!("{}", version.to_version_string());
            }
        }
        Command::Release { pre_release } => {
            let version = finder.get_release_version(&head, pre_release.as_deref())?;
            println!("{}", version.to_version_string());
        }
        Command::Changelog => {
            for commit in finder.get_changelog(&head)? {
                println!(
                    "{} {}",
                    style(commit.short_sha()).yellow(),
                    commit.summary()
                );
            }
        }
    }

    Ok(())
}
