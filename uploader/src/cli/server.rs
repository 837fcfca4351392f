use clap::ArgMatches;
use server::config::Config;

pub async fn run(matches: &ArgMatches) {
    let mut config = Config::from_env();
    if let Some(port) = matches.get_one::<u16>("port") {
        config.port = *port;
    }
    if let Some(workers) = matches.get_one::<u16>("workers") {
        config.workers = (*workers).max(1);
    }

    if let Err(e) = server::run(config).await {
        tracing::error!("server failed: {e}");
        std::process::exit(1);
    }
}
