use std::env;
use std::path::{Path, PathBuf};

use kernel::MAX_FILE_SIZE;

const DB_FILE: &str = "images.db";
const CURRENT_DIR: &str = "./";
const IMAGE_DIR: &str = "images";
const FRONTEND_DIR: &str = "frontend";
const PORT: u16 = 8000;

/// Server settings, read from `UPLOADER_*` environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub workers: u16,
    pub data_dir: PathBuf,
    pub db_file: String,
    pub image_dir: PathBuf,
    pub frontend_dir: PathBuf,
    pub max_file_size: u64,
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(var_or("UPLOADER_DATA_DIR", CURRENT_DIR));
        let image_dir = resolve(&data_dir, &var_or("UPLOADER_IMAGE_DIR", IMAGE_DIR));
        let frontend_dir = resolve(&data_dir, &var_or("UPLOADER_FRONTEND_DIR", FRONTEND_DIR));
        Self {
            port: parsed_or("UPLOADER_PORT", PORT),
            workers: parsed_or("UPLOADER_WORKERS", 1).max(1),
            db_file: var_or("UPLOADER_DB_FILE", DB_FILE),
            max_file_size: parsed_or("UPLOADER_MAX_FILE_SIZE", MAX_FILE_SIZE),
            data_dir,
            image_dir,
            frontend_dir,
        }
    }

    /// Settings rooted at `data_dir`, everything else at its default.
    #[must_use]
    pub fn in_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            port: PORT,
            workers: 1,
            db_file: DB_FILE.to_owned(),
            image_dir: data_dir.join(IMAGE_DIR),
            frontend_dir: data_dir.join(FRONTEND_DIR),
            max_file_size: MAX_FILE_SIZE,
            data_dir,
        }
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| String::from(default))
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn resolve(base: &Path, dir: &str) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
