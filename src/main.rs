use clap::{App, Arg};
use reprise::build::build_site;
use reprise::config::Config;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt::init();

    let matches = App::new("reprise")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates the static site for a dated, tagged plain-text blog")
        .arg(
            Arg::with_name("project-root")
                .help("Project root directory (defaults to the current directory)")
                .index(1),
        )
        .get_matches();

    let root = match matches.value_of("project-root") {
        Some(path) => PathBuf::from(path),
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(err) => {
                error!("resolving current directory: {}", err);
                process::exit(1);
            }
        },
    };

    let config = match Config::from_directory(&root) {
        Ok(config) => config,
        Err(err) => {
            error!("loading configuration: {}", err);
            process::exit(1);
        }
    };

    if let Err(err) = build_site(&config) {
        error!("building site: {}", err);
        process::exit(1);
    }
    info!("site published to {}", config.dirs.public.display());
}
