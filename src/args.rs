use clap::{value_parser, Arg, ArgMatches, Command};

/// Builds the command-line interface.
pub fn command() -> Command {
    let bold_underline = "\x1b[1;4m";
    let bold = "\x1b[1m";
    let reset = "\x1b[0m";

    Command::new("filecensus")
        .version(clap::crate_version!())
        .about(format!(
            "\n\n{}Program:{} {}filecensus{} (resumable file checksum inventory)\n\
            Version: {}",
            bold_underline,
            reset,
            bold,
            reset,
            clap::crate_version!()
        ))
        .arg(
            Arg::new("source")
                .help("The directory whose files are inventoried (required)")
                .value_name("SOURCE_DIR")
                .index(1)
                .required(true),
        )
        .arg(
            Arg::new("work-dir")
                .help(
                    "Existing folder for FileList.txt and FileInfo.txt [./filecensus_<timestamp>]",
                )
                .value_name("WORK_DIR")
                .index(2),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .value_name("N")
                .help("Number of files hashed in parallel [available CPUs]")
                .value_parser(value_parser!(u64).range(1..))
                .num_args(1),
        )
        .arg(
            Arg::new("progress-every")
                .long("progress-every")
                .value_name("N")
                .help("Log progress after every N files [250]")
                .value_parser(value_parser!(u64).range(1..))
                .num_args(1),
        )
        .arg(
            Arg::new("max-files")
                .long("max-files")
                .value_name("N")
                .help("Stop after N files; run again to continue [no limit]")
                .value_parser(value_parser!(u64).range(1..))
                .num_args(1),
        )
        .arg_required_else_help(true)
}

/// Parses command-line arguments using clap.
pub fn parse_args() -> ArgMatches {
    command().get_matches()
}
