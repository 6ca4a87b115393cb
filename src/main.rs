use clap::Parser;

mod cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Cli::parse();

    if let Err(e) = cli::run(args) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
