use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use log::{debug, info};

use extract_snippets::load_snippets;
use inject_snippets::{InjectOptions, Injector};

mod config;
use config::AppConfig;

fn main() -> Result<()> {
    let matches = Command::new("snippet_injector")
        .version("0.1.0")
        .about("Extracts labeled code snippets from source comments and injects them into documentation files")
        .arg(
            Arg::new("root")
                .long("root")
                .short('r')
                .required(true)
                .help("Root of snippet sources"),
        )
        .arg(
            Arg::new("docs_root")
                .long("docs-root")
                .short('d')
                .required(true)
                .help("Root of documentation sources"),
        )
        .arg(
            Arg::new("source_ext")
                .long("source-file-extension-filter")
                .short('s')
                .default_value(".js|.ts")
                .help("Ordered, pipe-separated list of source file extensions"),
        )
        .arg(
            Arg::new("target_ext")
                .long("target-file-extension-filter")
                .short('t')
                .default_value(".md")
                .help("Pipe-separated list of documentation file extensions"),
        )
        .arg(
            Arg::new("snippet_titles")
                .long("snippet-titles")
                .default_value("JavaScript|TypeScript")
                .help("Code fence titles, positionally aligned with the source extensions"),
        )
        .arg(
            Arg::new("placeholder_prefix")
                .long("placeholder-prefix")
                .default_value("%%")
                .help("Prefix of placeholder tokens in documentation files"),
        )
        .arg(
            Arg::new("placeholder_suffix")
                .long("placeholder-suffix")
                .default_value("%%")
                .help("Suffix of placeholder tokens in documentation files"),
        )
        .arg(
            Arg::new("wrap")
                .long("wrap")
                .num_args(1)
                .value_parser(clap::value_parser!(bool))
                .default_value("true")
                .help("Keep placeholder tags around injected content for idempotent re-runs"),
        )
        .arg(
            Arg::new("log_level")
                .long("log-level")
                .short('l')
                .default_value("info")
                .value_parser(["error", "warn", "info", "debug", "trace"])
                .help("Level of detail in logs"),
        )
        .get_matches();

    let config = AppConfig {
        root: matches.get_one::<String>("root").unwrap().clone(),
        docs_root: matches.get_one::<String>("docs_root").unwrap().clone(),
        source_extension_filter: matches.get_one::<String>("source_ext").unwrap().clone(),
        target_extension_filter: matches.get_one::<String>("target_ext").unwrap().clone(),
        snippet_titles: matches.get_one::<String>("snippet_titles").unwrap().clone(),
        placeholder_prefix: matches.get_one::<String>("placeholder_prefix").unwrap().clone(),
        placeholder_suffix: matches.get_one::<String>("placeholder_suffix").unwrap().clone(),
        wrap: *matches.get_one::<bool>("wrap").unwrap(),
        log_level: matches.get_one::<String>("log_level").unwrap().clone(),
    };

    let level = log::LevelFilter::from_str(&config.log_level)
        .context("Invalid log level")?;
    env_logger::Builder::new().filter_level(level).init();
    debug!("config: {:?}", config);

    let source_types: Vec<String> = config
        .source_extension_filter
        .split('|')
        .map(str::to_string)
        .collect();

    info!("Loading snippets from {}", config.root);
    let store = load_snippets(Path::new(&config.root), &source_types)
        .context("Failed to load snippets")?;
    info!("Loaded {} snippets", store.len());

    let injector = Injector::new(InjectOptions {
        source_extension_filter: config.source_extension_filter.clone(),
        target_extension_filter: config.target_extension_filter.clone(),
        snippet_titles: config.snippet_titles.clone(),
        placeholder_prefix: config.placeholder_prefix.clone(),
        placeholder_suffix: config.placeholder_suffix.clone(),
        wrap: config.wrap,
    })?;

    info!("Injecting snippets into documents under {}", config.docs_root);
    injector
        .inject(&store, Path::new(&config.docs_root))
        .context("Failed to inject snippets")?;

    Ok(())
}
