#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const HT_CONFIG_FILE_NAME: &str = "ht_config.toml";

#[derive(Deserialize, Debug, Clone)]
pub struct HtConfig {
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    /// Width of the 3-D window in columns, height follows from it.
    #[serde(default = "default_view_width")]
    pub view_width: usize,
    /// Skip the intermission waits, used by tests and demo runs.
    #[serde(default)]
    pub no_wait: bool,
    #[serde(default)]
    pub enable_debug: bool,
}

fn default_data_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_view_width() -> usize {
    320
}

// Load the config from the config file if it exists.
// Checks first the arguments for a config file and after that
// the current working dir for the presence of a ht_config.toml file.
// Returns the default config if neither is there.
pub fn read_ht_config() -> Result<HtConfig, String> {
    if let Some(conf_arg) = check_config_arg() {
        let path = Path::new(&conf_arg);
        return read_conf_file(path);
    }

    let conf_file = Path::new(HT_CONFIG_FILE_NAME);
    if conf_file.exists() {
        read_conf_file(conf_file)
    } else {
        default_ht_config()
    }
}

fn read_conf_file(conf_file: &Path) -> Result<HtConfig, String> {
    let content = fs::read_to_string(conf_file).map_err(|e| e.to_string())?;
    let config: HtConfig = toml::from_str(&content).map_err(|e| e.to_string())?;
    Ok(config)
}

pub fn default_ht_config() -> Result<HtConfig, String> {
    toml::from_str("").map_err(|e: toml::de::Error| e.to_string())
}

fn check_config_arg() -> Option<String> {
    let mut args = env::args();
    while let Some(arg) = args.next() {
        if arg == "-config" {
            return args.next();
        }
    }
    None
}
