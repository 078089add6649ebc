use std::path::PathBuf;
use std::{env, fs};

use serde::Deserialize;

use crate::util::dates::{self, Window};
use crate::{fmt, Error};

#[derive(Debug, Deserialize, Clone)]
struct FileConfig {
    pub guild_id: u32,
    pub start_date: String,
    pub end_date: String,
    pub games_to_list: usize,
    pub throttle_ms: u64,
    pub members_per_page: u32,
    pub members_file: String,
    pub log: FileLogConfig,
}

#[derive(Debug, Deserialize, Clone)]
struct FileLogConfig {
    pub level: String,
    pub path: String,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: String,
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub guild_id: u32,
    pub window: Window,
    pub games_to_list: usize,
    pub throttle_ms: u64,
    pub members_per_page: u32,
    pub members_file: PathBuf,
    pub log: LogConfig,
}

fn expand_tilde(path: &str) -> Result<PathBuf, Error> {
    if path.starts_with("~/") {
        let home = env::var("HOME")?;
        Ok(PathBuf::from(path.replacen("~", &home, 1)))
    } else {
        Ok(PathBuf::from(path))
    }
}

pub fn load_config() -> Result<AppConfig, Error> {
    let exe_path = env::current_exe()?;
    let config_path = match exe_path.parent() {
        Some(dir) => dir.join("guildplays.toml"),
        _ => return Err("failed to determine executable directory".into()),
    };

    if !config_path.exists() || !config_path.is_file() {
        return Err(fmt!(
            "Config file does not exist or is not a file: {}",
            config_path.display()
        )
        .into());
    }
    let s = fs::read_to_string(&config_path)?;
    let cfg: FileConfig = toml::from_str(&s)?;

    let window = Window::parse(&cfg.start_date, &cfg.end_date)?;

    if cfg.games_to_list == 0 {
        return Err("games_to_list must be at least 1".into());
    }
    if cfg.members_per_page == 0 {
        return Err("members_per_page must be at least 1".into());
    }

    let members_file = expand_tilde(&cfg.members_file)?;
    if members_file.exists() && !members_file.is_file() {
        return Err(fmt!(
            "Members cache path exists but is not a file: {}",
            members_file.display()
        )
        .into());
    }
    if let Some(parent) = members_file.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(fmt!(
                "Members cache directory does not exist: {}",
                parent.display()
            )
            .into());
        }
    }

    Ok(AppConfig {
        guild_id: cfg.guild_id,
        window,
        games_to_list: cfg.games_to_list,
        throttle_ms: cfg.throttle_ms,
        members_per_page: cfg.members_per_page,
        members_file,
        log: build_log_config(cfg.log)?,
    })
}

fn build_log_config(file_log: FileLogConfig) -> Result<LogConfig, Error> {
    let path = log_file_replacements(&file_log.path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(fmt!("Log file directory does not exist: {}", parent.display()).into());
        }
    }
    if path.exists() && !path.is_file() {
        return Err(fmt!("Log path exists but is not a file: {}", file_log.path).into());
    }

    Ok(LogConfig {
        level: file_log.level,
        path,
    })
}

fn log_file_replacements(cfg_path: &str) -> Result<PathBuf, Error> {
    let date_str = dates::local_date_yyyy_mm_dd();
    let replaced = cfg_path.replace("{DATE}", &date_str);
    expand_tilde(&replaced)
}
