// External crates
use env_logger::Env;
use log::error;

// Import functions
use filecensus::parse_args;
use filecensus::run;

/// Entry point of the program.
fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = parse_args();
    if let Err(e) = run(matches) {
        error!("{}", e);
        std::process::exit(1);
    }
}
