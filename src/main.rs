use clap::{App, Arg};
use exifstash::build;
use exifstash::config::{Config, PROJECT_FILE};
use std::path::PathBuf;
use std::process;

fn main() {
    let matches = App::new("exifstash")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fetches a photo gallery's images once and caches their camera metadata")
        .arg(
            Arg::with_name("directory")
                .short("C")
                .long("directory")
                .takes_value(true)
                .value_name("DIR")
                .help("Directory from which to search for the project file (defaults to `.`)"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log per-image extraction details"),
        )
        .get_matches();

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if matches.is_present("verbose") {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        },
    );
    clog.init();

    let directory = PathBuf::from(matches.value_of("directory").unwrap_or("."));
    let config = match Config::from_directory(&directory) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{:#} (see `{}`)", err, PROJECT_FILE);
            process::exit(1);
        }
    };

    if let Err(err) = build::refresh_cache(&config) {
        log::error!("{}", err);
        process::exit(1);
    }
}
