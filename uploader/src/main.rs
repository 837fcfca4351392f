use clap::{arg, command, crate_name, value_parser, Arg, ArgAction, Command};

mod cli;

#[tokio::main]
async fn main() {
    server::init_tracing(cli::DEFAULT_LOG_FILTER);

    let cli = build_cli().get_matches();

    match cli.subcommand() {
        Some((cli::VERSION_SUBCOMMAND, matches)) => cli::version::run(matches.get_flag("json")),
        Some((cli::BUGREPORT_SUBCOMMAND, _)) => cli::bugreport::run(),
        Some((cli::SERVER_SUBCOMMAND, matches)) => cli::server::run(matches).await,
        Some((cli::UPLOAD_SUBCOMMAND, matches)) => cli::client::upload(matches).await,
        Some((cli::IMAGES_SUBCOMMAND, matches)) => cli::client::images(matches).await,
        Some((cli::DELETE_SUBCOMMAND, matches)) => cli::client::delete(matches).await,
        Some((cli::BROWSE_SUBCOMMAND, matches)) => cli::client::browse(matches).await,
        _ => {}
    }
}

fn build_cli() -> Command {
    command!(crate_name!())
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .subcommand(
            Command::new(cli::VERSION_SUBCOMMAND)
                .about(cli::VERSION_DESCRIPTION)
                .arg(arg!(--json "Print as JSON").action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new(cli::BUGREPORT_SUBCOMMAND).about(cli::BUGREPORT_DESCRIPTION))
        .subcommand(
            Command::new(cli::SERVER_SUBCOMMAND)
                .about(cli::SERVER_DESCRIPTION)
                .arg(
                    arg!(-p --port <PORT>)
                        .required(false)
                        .value_parser(value_parser!(u16))
                        .help("Port to listen on, overrides UPLOADER_PORT"),
                )
                .arg(
                    arg!(-w --workers <WORKERS>)
                        .required(false)
                        .value_parser(value_parser!(u16))
                        .help("Number of listeners on consecutive ports, overrides UPLOADER_WORKERS"),
                ),
        )
        .subcommand(
            with_storage(Command::new(cli::UPLOAD_SUBCOMMAND))
                .about(cli::UPLOAD_DESCRIPTION)
                .arg(
                    Arg::new("files")
                        .value_name("FILE")
                        .required(true)
                        .num_args(1..)
                        .help("Image files to upload"),
                ),
        )
        .subcommand(
            with_storage(Command::new(cli::IMAGES_SUBCOMMAND))
                .about(cli::IMAGES_DESCRIPTION)
                .arg(page_arg()),
        )
        .subcommand(
            with_storage(Command::new(cli::DELETE_SUBCOMMAND))
                .about(cli::DELETE_DESCRIPTION)
                .arg(
                    Arg::new("key")
                        .value_name("KEY")
                        .required(true)
                        .help("Server file name, or list position with --local"),
                )
                .arg(page_arg()),
        )
        .subcommand(with_storage(Command::new(cli::BROWSE_SUBCOMMAND)).about(cli::BROWSE_DESCRIPTION))
        .arg_required_else_help(true)
        .disable_version_flag(true)
}

fn with_storage(cmd: Command) -> Command {
    cmd.arg(
        arg!(-u --uri <URI>)
            .required(false)
            .env("UPLOADER_URI")
            .default_value(cli::DEFAULT_URI)
            .help("Upload server URI"),
    )
    .arg(
        arg!(-l --local <FILE>)
            .required(false)
            .help("Keep images in this local JSON store instead of the server"),
    )
    .arg(
        arg!(--journal <FILE>)
            .required(false)
            .help("Also record server uploads in this local JSON store"),
    )
}

fn page_arg() -> Arg {
    arg!(-p --page <PAGE>)
        .required(false)
        .value_parser(value_parser!(usize))
        .default_value("1")
        .help("Gallery page, starting at 1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn upload_takes_many_files() {
        let matches = build_cli()
            .try_get_matches_from(["uploader", "upload", "-l", "store.json", "a.png", "b.gif"])
            .unwrap();
        let (_, upload) = matches.subcommand().unwrap();

        let files: Vec<&String> = upload.get_many::<String>("files").unwrap().collect();

        assert_eq!(files, ["a.png", "b.gif"]);
        assert_eq!(upload.get_one::<String>("local").map(String::as_str), Some("store.json"));
    }

    #[test]
    fn images_page_defaults_to_first() {
        let matches = build_cli().try_get_matches_from(["uploader", "images"]).unwrap();
        let (_, images) = matches.subcommand().unwrap();

        assert_eq!(images.get_one::<usize>("page"), Some(&1));
    }

    #[test]
    fn images_page_past_end_is_accepted() {
        let matches = build_cli()
            .try_get_matches_from(["uploader", "images", "--page", "99"])
            .unwrap();
        let (_, images) = matches.subcommand().unwrap();

        assert_eq!(images.get_one::<usize>("page"), Some(&99));
    }
}
