use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub data_extension: String,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            data_extension: env::var("DATA_EXTENSION").unwrap_or_else(|_| "hts".to_string()),
        }
    }
}
