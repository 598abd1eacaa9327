use std::net::IpAddr;
use std::path::PathBuf;

use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub trusted_proxies: Vec<IpNet>,
    pub log_level: String,
    pub allowed_origins: Vec<String>,
    pub local_workbook_path: PathBuf,
    pub rate_limit: u32,
    pub rate_limit_window_secs: u64,
    pub honeypot_field: Option<String>,
    pub drive: Option<DriveConfig>,
}

/// Google Drive service-account credentials. Only present when both
/// `GOOGLE_CLIENT_EMAIL` and `GOOGLE_PRIVATE_KEY` are set; without them the
/// remote backend is never attempted.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub client_email: String,
    pub private_key: String,
    pub folder_id: Option<String>,
    pub file_name: String,
    pub token_uri: String,
    pub api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("POSTBOX_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid POSTBOX_HOST: {e}"))?;

        let port: u16 = env_or("POSTBOX_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid POSTBOX_PORT: {e}"))?;

        let max_body_size: usize = env_or("POSTBOX_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid POSTBOX_MAX_BODY_SIZE: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_or("POSTBOX_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid POSTBOX_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let log_level = env_or("POSTBOX_LOG_LEVEL", "info");

        // Comma-separated origin list; a `*` entry allows everyone
        let allowed_origins: Vec<String> = env_or("POSTBOX_ALLOWED_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let local_workbook_path =
            PathBuf::from(env_or("POSTBOX_WORKBOOK_PATH", "contact_submissions.xlsx"));

        let rate_limit: u32 = env_or("POSTBOX_RATE_LIMIT", "10")
            .parse()
            .map_err(|e| format!("Invalid POSTBOX_RATE_LIMIT: {e}"))?;

        let rate_limit_window_secs: u64 = env_or("POSTBOX_RATE_LIMIT_WINDOW_SECS", "60")
            .parse()
            .map_err(|e| format!("Invalid POSTBOX_RATE_LIMIT_WINDOW_SECS: {e}"))?;

        let honeypot_field = std::env::var("POSTBOX_HONEYPOT_FIELD")
            .ok()
            .filter(|s| !s.is_empty());

        let drive = match (
            std::env::var("GOOGLE_CLIENT_EMAIL").ok(),
            std::env::var("GOOGLE_PRIVATE_KEY").ok(),
        ) {
            (Some(client_email), Some(private_key)) => Some(DriveConfig {
                client_email,
                // Deployment env vars often carry the PEM with literal \n escapes
                private_key: private_key.replace("\\n", "\n"),
                folder_id: std::env::var("GOOGLE_DRIVE_FOLDER_ID").ok(),
                file_name: env_or("POSTBOX_DRIVE_FILE_NAME", "contact_form_submissions.xlsx"),
                token_uri: env_or("GOOGLE_TOKEN_URI", "https://oauth2.googleapis.com/token"),
                api_base: env_or("GOOGLE_API_BASE", "https://www.googleapis.com"),
            }),
            _ => None,
        };

        Ok(Config {
            host,
            port,
            max_body_size,
            trusted_proxies,
            log_level,
            allowed_origins,
            local_workbook_path,
            rate_limit,
            rate_limit_window_secs,
            honeypot_field,
            drive,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
