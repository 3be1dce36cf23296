use colored::Colorize;

pub mod crawl;
pub mod data;
pub mod output;

const BANNER: &str = r#"
   __ _ _                                    _
  / _(_) |_ __ ___   ___ _ __ __ ___      __| |
 | |_| | | '_ ` _ \ / __| '__/ _` \ \ /\ / /| |
 |  _| | | | | | | | (__| | | (_| |\ V  V / | |
 |_| |_|_|_| |_| |_|\___|_|  \__,_| \_/\_/  |_|
"#;

/// Goes to stderr; stdout carries the records.
pub fn print_banner() {
    eprintln!("{}", BANNER.bright_cyan().bold());
    eprintln!(
        "  {} {}\n",
        "film category crawler".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
