use sketchbook::config::{self, Command, USAGE};
use sketchbook::gallery;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let command = match config::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    match command {
        Command::Help => println!("{}", USAGE),
        Command::List => {
            for experiment in gallery::catalog() {
                println!(
                    "{:<14} {:<14} {}",
                    experiment.id, experiment.title, experiment.description
                );
            }
        }
        Command::Run(config) => {
            log::info!("starting '{}' (seed {})", config.experiment, config.seed);
            if let Err(e) = sketchbook::window::run(config) {
                log::error!("{}", e);
                std::process::exit(1);
            }
        }
    }
}
