//! CLI argument definitions.
//!
//! Only a few flags belong to the bootstrap; everything else is meant for
//! the TLJH installer. [`split_known_args`] separates the two before clap
//! parses the bootstrap's share, so unknown flags never cause a usage error.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::progress::{PROGRESS_PAGE_PORT, SERVER_SUBCOMMAND};

/// Bootstrap an installation of The Littlest JupyterHub.
#[derive(Debug, Parser)]
#[command(name = "tljh-bootstrap")]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true)]
#[command(
    after_help = "All other flags are passed through to the TLJH installer without interception."
)]
pub struct Cli {
    /// Start a web server on port 80 showing installation logs. Its pid is
    /// passed to the TLJH installer as --progress-page-server-pid for later
    /// termination.
    #[arg(long)]
    pub show_progress_page: bool,

    /// TLJH version or git reference. 'latest' (the default) is the most
    /// recent release; partial versions such as '1', '1.0' or '1.0.0'
    /// resolve to the newest matching release. Branch names such as 'main'
    /// and commit hashes are used as given.
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Internal subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the progress page (started by the bootstrap itself)
    #[command(name = "progress-server", hide = true)]
    ProgressServer(ProgressServerArgs),
}

/// Arguments for the `progress-server` subcommand.
#[derive(Debug, Clone, clap::Args)]
pub struct ProgressServerArgs {
    /// Installer log served at /logs
    #[arg(long)]
    pub log_file: PathBuf,

    /// Port to listen on
    #[arg(long, default_value_t = PROGRESS_PAGE_PORT)]
    pub port: u16,
}

impl Cli {
    /// Parse the bootstrap's flags, returning the rest for the installer.
    ///
    /// Exits with a usage message on invalid bootstrap flags.
    pub fn parse_known<I>(args: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = String>,
    {
        let (known, forwarded) = split_known_args(args);
        (Self::parse_from(known), forwarded)
    }

    /// Like [`Cli::parse_known`] but returns clap errors instead of exiting.
    pub fn try_parse_known<I>(args: I) -> Result<(Self, Vec<String>), clap::Error>
    where
        I: IntoIterator<Item = String>,
    {
        let (known, forwarded) = split_known_args(args);
        Ok((Self::try_parse_from(known)?, forwarded))
    }

    /// The explicitly requested version; an empty value counts as unset.
    pub fn requested_version(&self) -> Option<&str> {
        self.version.as_deref().filter(|version| !version.is_empty())
    }
}

/// Long flags owned by the bootstrap.
const LONG_FLAGS: &[&str] = &["--show-progress-page", "--version", "--help"];

/// Expand a bootstrap long flag or an unambiguous prefix of one.
///
/// `--vers=1.0` becomes `--version=1.0`. Returns `None` for anything that
/// is not a bootstrap flag.
fn expand_long_flag(arg: &str) -> Option<String> {
    let (name, value) = match arg.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (arg, None),
    };
    if name.len() <= 2 || !name.starts_with("--") {
        return None;
    }

    let mut candidates = LONG_FLAGS.iter().filter(|flag| flag.starts_with(name));
    let flag = candidates.next()?;
    if candidates.next().is_some() {
        return None;
    }

    Some(match value {
        Some(value) => format!("{flag}={value}"),
        None => flag.to_string(),
    })
}

/// Split a command line into the bootstrap's arguments and forwarded ones.
///
/// The first element (program name) stays with the bootstrap. The hidden
/// server subcommand keeps the whole command line. Bootstrap long flags may
/// be abbreviated as long as the prefix is unambiguous. After a literal `--`
/// everything is forwarded.
pub fn split_known_args<I>(args: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let mut known: Vec<String> = args.next().into_iter().collect();
    let mut forwarded = Vec::new();

    if args.peek().map(String::as_str) == Some(SERVER_SUBCOMMAND) {
        known.extend(args);
        return (known, forwarded);
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--" => forwarded.extend(args.by_ref()),
            "-h" => known.push(arg),
            _ => match expand_long_flag(&arg) {
                Some(flag) if flag == "--version" => {
                    known.push(flag);
                    known.extend(args.next());
                }
                Some(flag) => known.push(flag),
                None => forwarded.push(arg),
            },
        }
    }

    (known, forwarded)
}
