//! Command-line probe for the studio core.
//!
//! # Responsibility
//! - Open the configured SQLite store and run one core operation per call.
//! - Keep output line-oriented for quick local inspection.

use log::warn;
use std::path::PathBuf;
use std::process::ExitCode;
use studio_core::{
    core_version, init_logging_from_config, ColorMode, DraftService, IconService,
    InMemoryStyleScope, PublishService, SqliteStore, StorageAdapter, StudioConfig, ThemeService,
};

const USAGE: &str = "usage: studio [--config PATH] <command>

commands:
  version                         print core version
  drafts                          list drafts (current marked with *)
  new <content>                   create a draft and make it current
  clean                           prune orphan drafts
  themes                          list themes (active marked with *)
  apply-theme <id>                apply a theme and print its :root block
  icons                           list icons
  recolor <icon-id> <color> [main|fill]
  published                       list published articles";

fn main() -> ExitCode {
    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let (config_path, rest) = split_config_flag(args)?;
    let Some((command, params)) = rest.split_first() else {
        println!("{USAGE}");
        return Ok(());
    };
    if command == "version" {
        println!("studio_core version={}", core_version());
        return Ok(());
    }

    let config = StudioConfig::load_or_default(config_path).map_err(|err| err.to_string())?;
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| err.to_string())?;
    }
    let store = SqliteStore::open(&config.db_path).map_err(|err| err.to_string())?;

    match (command.as_str(), params) {
        ("drafts", []) => {
            let drafts = DraftService::new(StorageAdapter::new(&store));
            let current = drafts.get_current_draft_id();
            for draft in drafts.get_drafts() {
                let marker = if current.as_deref() == Some(draft.id.as_str()) { "*" } else { " " };
                println!("{marker} {}\t{}", draft.id, draft.title);
            }
        }
        ("new", [content]) => {
            let drafts = DraftService::new(StorageAdapter::new(&store));
            let draft = drafts.create_draft(content.as_str()).map_err(|err| err.to_string())?;
            drafts.set_current_draft_id(&draft.id);
            println!("{}\t{}", draft.id, draft.title);
        }
        ("clean", []) => {
            let drafts = DraftService::new(StorageAdapter::new(&store));
            println!("removed={}", drafts.clean_orphan_drafts());
        }
        ("themes", []) => {
            let mut themes = ThemeService::new(StorageAdapter::new(&store));
            themes.init();
            let active = themes.get_active_theme().map(|theme| theme.id.clone());
            for theme in themes.get_themes() {
                let marker = if active.as_deref() == Some(theme.id.as_str()) { "*" } else { " " };
                let system = if theme.is_system_theme { " (system)" } else { "" };
                println!("{marker} {}\t{}{system}", theme.id, theme.name);
            }
        }
        ("apply-theme", [id]) => {
            let mut themes = ThemeService::new(StorageAdapter::new(&store));
            themes.init();
            let mut scope = InMemoryStyleScope::new();
            themes
                .apply_theme(id, &mut scope)
                .map_err(|err| err.to_string())?;
            println!("{}", scope.render_root_css());
        }
        ("icons", []) => {
            let icons = IconService::new(StorageAdapter::new(&store));
            for icon in icons.get_icons() {
                let color = icon.color.as_deref().unwrap_or("-");
                println!("{}\t{}\t{}\t{}", icon.id, icon.name, color, icon.color_mode);
            }
        }
        ("recolor", [id, color, rest @ ..]) if rest.len() <= 1 => {
            let mode = match rest.first() {
                Some(value) => value.parse::<ColorMode>().map_err(|err| err.to_string())?,
                None => ColorMode::Main,
            };
            let icons = IconService::new(StorageAdapter::new(&store));
            let icon = icons
                .update_icon_color(id, color, mode)
                .map_err(|err| err.to_string())?;
            println!("{}", icon.svg);
        }
        ("published", []) => {
            let published = PublishService::new(StorageAdapter::new(&store));
            for article in published.get_published() {
                println!("{}\t{}\t{}", article.id, article.published_at, article.title);
            }
        }
        _ => {
            warn!("event=cli_usage module=cli status=error command={command}");
            return Err(format!("unknown command or arguments\n\n{USAGE}"));
        }
    }
    Ok(())
}

fn split_config_flag(args: Vec<String>) -> Result<(PathBuf, Vec<String>), String> {
    let mut config_path = StudioConfig::default_path();
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let value = iter
                .next()
                .ok_or_else(|| "--config requires a path".to_string())?;
            config_path = PathBuf::from(value);
        } else {
            rest.push(arg);
        }
    }
    Ok((config_path, rest))
}
