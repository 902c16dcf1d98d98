use std::env;
use std::path::PathBuf;

use crate::payment::GatewayMode;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub storage_root: PathBuf,
    /// Base used when building download links handed back to buyers.
    pub public_base_url: String,
    pub messaging_phone: String,
    pub payment_gateway: GatewayMode,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let storage_root = env::var("STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("storage"));
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"));
        let messaging_phone =
            env::var("MESSAGING_PHONE").unwrap_or_else(|_| "123456789".to_string());
        let payment_gateway = match env::var("PAYMENT_GATEWAY") {
            Ok(value) => value.parse::<GatewayMode>()?,
            Err(_) => GatewayMode::Simulated,
        };
        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            storage_root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            messaging_phone,
            payment_gateway,
            max_upload_bytes,
        })
    }

    pub fn download_url(&self, token: &str) -> String {
        format!("{}/api/download/{}", self.public_base_url, token)
    }
}
