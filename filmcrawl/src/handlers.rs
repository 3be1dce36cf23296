use clap::ArgMatches;
use colored::Colorize;
use filmcrawl_core::data::Database;
use filmcrawl_core::output::{OutputFormat, render_records, save_output};
use filmcrawl_scanner::FilmRecord;
use filmcrawl_scanner::category::DEFAULT_START_URL;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Environment variable that switches enrichment on without `--imdb`
pub const IMDB_ENV_VAR: &str = "FILMCRAWL_IMDB";

// Helper functions for the crawl and film handlers

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&Url>,
    urls_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(urls_file_path) = urls_file {
        load_urls_from_file(urls_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --urls-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file. Blank lines and `#` comments are skipped.
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read URLs file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add https:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("https://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("{} Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

/// Textual on/off switch: `1`, `true`, `yes` and `y` (any case) mean on
pub fn parse_toggle(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

fn imdb_from_env() -> bool {
    std::env::var(IMDB_ENV_VAR)
        .map(|v| parse_toggle(&v))
        .unwrap_or(false)
}

/// Open (creating if needed) the record database at a tilde-expandable path
pub fn open_database(raw_path: &str) -> Result<Database, String> {
    let expanded = shellexpand::tilde(raw_path);
    let db_path = Path::new(expanded.as_ref());

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }

    Database::new(db_path).map_err(|e| format!("Failed to open database {}: {}", db_path.display(), e))
}

/// Render records and write them to `output`, or to stdout when no path is given
pub fn write_records(
    records: &[FilmRecord],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), String> {
    let content = render_records(records, format)
        .map_err(|e| format!("Failed to serialize records: {}", e))?;

    match output {
        Some(path) => save_output(&content, path)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e)),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

// Re-export crawl types and functions from filmcrawl-core
pub use filmcrawl_core::crawl::{
    CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path, generate_crawl_summary,
};

fn print_config_line(label: &str, value: impl std::fmt::Display) {
    eprintln!("{} {:<11} {}", "→".blue(), label, value.to_string().bright_white());
}

/// Options shared by `crawl` and `film`
fn base_options(sub_matches: &ArgMatches) -> CrawlOptions {
    CrawlOptions {
        enrich: sub_matches.get_flag("imdb") || imdb_from_env(),
        threads: *sub_matches.get_one::<usize>("threads").unwrap_or(&8),
        timeout_secs: *sub_matches.get_one::<u64>("timeout").unwrap_or(&30),
        show_progress_bars: true,
        ..CrawlOptions::default()
    }
}

pub async fn handle_crawl(sub_matches: &ArgMatches) {
    let start_url = sub_matches
        .get_one::<Url>("start-url")
        .map(|u| u.to_string())
        .unwrap_or_else(|| DEFAULT_START_URL.to_string());
    let max_films = *sub_matches.get_one::<usize>("max-films").unwrap_or(&200);

    let options = CrawlOptions {
        start_url,
        max_films,
        ..base_options(sub_matches)
    };

    eprintln!("\n{}", "Crawling film categories".bright_white().bold());
    print_config_line("Start:", &options.start_url);
    print_config_line("Max films:", options.max_films);
    print_config_line("Workers:", options.threads);
    print_config_line("IMDb:", if options.enrich { "on" } else { "off" });
    eprintln!();

    if let Err(e) = run_and_report(options, sub_matches).await {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

pub async fn handle_film(sub_matches: &ArgMatches) {
    let url = sub_matches.get_one::<Url>("url");
    let urls_file = sub_matches.get_one::<PathBuf>("urls-file");

    let urls = match load_urls_from_source(url, urls_file) {
        Ok(urls) => urls,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let options = CrawlOptions {
        start_url: urls.first().cloned().unwrap_or_default(),
        max_films: urls.len(),
        article_urls: urls,
        ..base_options(sub_matches)
    };

    eprintln!(
        "\n{}",
        format!("Extracting {} article(s)", options.article_urls.len())
            .bright_white()
            .bold()
    );
    print_config_line("Workers:", options.threads);
    print_config_line("IMDb:", if options.enrich { "on" } else { "off" });
    eprintln!();

    if let Err(e) = run_and_report(options, sub_matches).await {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

/// Run the crawl, store the records when `--db` is set, print the summary and
/// write the records out.
async fn run_and_report(options: CrawlOptions, sub_matches: &ArgMatches) -> Result<(), String> {
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| OutputFormat::from_str(f))
        .unwrap_or(OutputFormat::Text);
    let output = sub_matches.get_one::<PathBuf>("output");

    // Open the database up front so a bad path fails before any crawling
    let mut store = match sub_matches.get_one::<String>("db") {
        Some(raw_path) => {
            let db = open_database(raw_path)?;
            let session_id = db
                .create_session(&options.start_url, options.max_films, options.enrich)
                .map_err(|e| format!("Failed to create crawl session: {}", e))?;
            Some((db, session_id))
        }
        None => None,
    };

    let progress_callback: CrawlProgressCallback = Arc::new(|msg: String| {
        eprintln!("{} {}", "→".blue(), msg);
    });

    let records = match execute_crawl(options, Some(progress_callback), None).await {
        Ok(records) => records,
        Err(e) => {
            if let Some((ref db, ref session_id)) = store
                && let Err(db_err) = db.fail_session(session_id)
            {
                eprintln!("{} Failed to mark session failed: {}", "⚠".yellow(), db_err);
            }
            return Err(e);
        }
    };

    if let Some((ref mut db, ref session_id)) = store {
        let stored = db
            .insert_films(session_id, &records)
            .map_err(|e| format!("Failed to store records: {}", e))?;
        db.complete_session(session_id)
            .map_err(|e| format!("Failed to complete crawl session: {}", e))?;
        eprintln!(
            "{} Stored {} film(s) in session {}",
            "✓".green().bold(),
            stored,
            session_id.bright_white()
        );
    }

    eprint!("\n{}", generate_crawl_summary(&records));

    write_records(&records, format, output.map(PathBuf::as_path))?;
    if let Some(path) = output {
        eprintln!(
            "{} Records written to {}",
            "✓".green().bold(),
            path.display().to_string().bright_white()
        );
    }

    Ok(())
}
