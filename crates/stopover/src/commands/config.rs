use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => {
            let path = Config::path()?;
            set(&path, &key, &value)?;
            let shown = if key == "google.api_key" {
                "(hidden)"
            } else {
                value.as_str()
            };
            println!("{} {key} = {shown}", "Set".green().bold());
            println!("  {}", path.display().to_string().dimmed());
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", Config::path()?.display());
            Ok(())
        }
    }
}

/// Change one key in the file at `path`, keeping everything else in it.
fn set(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_existing_from(path)?;
    config.set(key, value)?;
    config.save_to(path)
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("  {}", "(not created yet, showing defaults)".dimmed());
    }
    println!();

    let mut redacted = config.clone();
    if let Some(key) = redacted.google.as_mut().and_then(|g| g.api_key.as_mut()) {
        *key = "********".to_string();
    }
    let yaml = serde_yaml::to_string(&redacted)?;
    print!("{yaml}");
    println!();

    println!("{} {}", "Backend:".bold(), config.backend_url());
    let key_state = if config.google_api_key().is_some() {
        "set".green()
    } else {
        "not set (search needs --selections)".yellow()
    };
    println!("{} {key_state}", "Google API key:".bold());
    match config.home {
        Some(home) => println!("{} {home}", "Home:".bold()),
        None => println!("{} {}", "Home:".bold(), "not set".dimmed()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("stopover-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("config.yaml")
    }

    #[test]
    fn test_set_keeps_other_keys() {
        let path = scratch("set-keeps");
        std::fs::write(&path, "google:\n  api_key: SECRET\n").unwrap();

        set(&path, "backend.url", "http://x:1").unwrap();

        let after = std::fs::read_to_string(&path).unwrap();
        assert!(after.contains("SECRET"), "api key lost: {after}");
        assert!(after.contains("http://x:1"));
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_set_refuses_to_overwrite_malformed_file() {
        let path = scratch("set-malformed");
        let original = "google:\n  api_key: SECRET\nhome: \"40.7,-74.0\"\n";
        std::fs::write(&path, original).unwrap();

        assert!(set(&path, "backend.url", "http://x:1").is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_set_creates_missing_file() {
        let path = scratch("set-new");
        set(&path, "home", "59.3293,18.0686").unwrap();
        let config = Config::load_existing_from(&path).unwrap();
        assert!(config.home.is_some());
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
