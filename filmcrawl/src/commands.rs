use crate::CLAP_STYLING;
use clap::{arg, command};
use filmcrawl_scanner::category::DEFAULT_START_URL;
use url::Url;

fn output_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(--"imdb")
            .required(false)
            .help(
                "Look up each film's Wikidata item, IMDb id and IMDb rating \
                (also enabled by FILMCRAWL_IMDB=1)",
            )
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(-t --"threads" <NUM_WORKERS>)
            .required(false)
            .help("The number of async worker 'threads' in the worker pool.")
            .value_parser(clap::value_parser!(usize))
            .default_value("8"),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("30"),
    )
    .arg(
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Write records to file (default: stdout)")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
    )
    .arg(
        arg!(-f --"format" <FORMAT>)
            .required(false)
            .help("Record format: text, json, jsonl, csv")
            .value_parser(["text", "json", "jsonl", "csv"])
            .default_value("text"),
    )
    .arg(
        arg!(--"db" <PATH>)
            .required(false)
            .help("Also store the records in this SQLite database (e.g. ~/.config/filmcrawl/films.db)"),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("filmcrawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("filmcrawl")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Log every crawl decision").required(false))
        .subcommand_required(false)
        .subcommand(output_args(
            command!("crawl")
                .about(
                    "Walk the film category tree and extract an infobox record for every \
                film article found.",
                )
                .arg(
                    arg!(--"start-url" <URL>)
                        .required(false)
                        .help("The category page to start from")
                        .value_parser(clap::value_parser!(Url))
                        .default_value(DEFAULT_START_URL),
                )
                .arg(
                    arg!(-m --"max-films" <NUM>)
                        .required(false)
                        .help("Stop once this many films have been extracted")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("200"),
                ),
        ))
        .subcommand(output_args(
            command!("film")
                .about("Extract records from the given article URLs, without walking categories")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The article URL to extract")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("urls-file"),
                )
                .arg(
                    arg!(-H --"urls-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of article URLs")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                ),
        ))
}
