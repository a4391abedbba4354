use clap::Parser;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "QsAlign - compares the quaternary structure of two macromolecular assemblies and reports the subunit correspondence, global RMSD and per-pair orientation angles.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Identifier (or file path) of the target assembly.
    #[arg(short, long, required = true, value_name = "IDENTIFIER")]
    pub target: String,

    /// Identifier (or file path) of the query assembly.
    #[arg(short, long, required = true, value_name = "IDENTIFIER")]
    pub query: String,

    /// Write the report to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to evaluate alignment seeds.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn parses_required_and_optional_arguments() {
        let cli = Cli::try_parse_from([
            "qsalign", "-t", "2xyz", "-q", "1abc", "-o", "out.tsv", "-vv", "-j", "4",
        ])
        .unwrap();
        assert_eq!(cli.target, "2xyz");
        assert_eq!(cli.query, "1abc");
        assert_eq!(cli.output, Some(PathBuf::from("out.tsv")));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(4));
        assert!(cli.config.is_none());
    }

    #[test]
    fn long_flags_are_accepted() {
        let cli =
            Cli::try_parse_from(["qsalign", "--target", "t", "--query", "q", "--quiet"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.output.is_none());
    }

    #[test]
    fn missing_target_is_an_error() {
        let err = Cli::try_parse_from(["qsalign", "-q", "1abc"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn help_and_version_are_not_failures() {
        let help = Cli::try_parse_from(["qsalign", "--help"]).unwrap_err();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);
        assert!(!help.use_stderr());

        let version = Cli::try_parse_from(["qsalign", "-V"]).unwrap_err();
        assert_eq!(version.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let err = Cli::try_parse_from(["qsalign", "-t", "t", "-q", "q", "--quiet", "-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }
}
