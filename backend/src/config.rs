//! Server configuration, read once from `MEDCODE_*` environment variables.

use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "medcode.sqlite";
pub const DEFAULT_STORAGE_DIR: &str = "storage";
pub const DEFAULT_FONTS_DIR: &str = "fonts";
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 25;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file holding every table.
    pub database_path: PathBuf,
    /// Root of the object storage; the `documents` bucket lives below it.
    pub storage_dir: PathBuf,
    /// Directory with the TTF family used for printable reports.
    pub fonts_dir: PathBuf,
    pub max_upload_bytes: u64,
    /// Open the default browser on the app URL after start-up.
    pub open_browser: bool,
    /// Administrator created on first start when no profile exists.
    pub bootstrap_admin: Option<(String, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            fonts_dir: PathBuf::from(DEFAULT_FONTS_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            open_browser: true,
            bootstrap_admin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so tests do not
    /// have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(host) = lookup("MEDCODE_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("MEDCODE_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| format!("MEDCODE_PORT must be a port number, got '{}'", port))?;
        }
        if let Some(path) = lookup("MEDCODE_DATABASE") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("MEDCODE_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("MEDCODE_FONTS_DIR") {
            config.fonts_dir = PathBuf::from(dir);
        }
        if let Some(mb) = lookup("MEDCODE_MAX_UPLOAD_MB") {
            let mb: u64 = mb
                .trim()
                .parse()
                .map_err(|_| format!("MEDCODE_MAX_UPLOAD_MB must be a number, got '{}'", mb))?;
            config.max_upload_bytes = mb * 1024 * 1024;
        }
        if let Some(flag) = lookup("MEDCODE_OPEN_BROWSER") {
            config.open_browser = parse_flag(&flag)
                .ok_or_else(|| format!("MEDCODE_OPEN_BROWSER must be true or false, got '{}'", flag))?;
        }
        if let (Some(email), Some(password)) =
            (lookup("MEDCODE_ADMIN_EMAIL"), lookup("MEDCODE_ADMIN_PASSWORD"))
        {
            config.bootstrap_admin = Some((email, password));
        }

        Ok(config)
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
