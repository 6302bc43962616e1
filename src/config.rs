use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub public_dir: String,
    pub staging_dir: String,
    pub database_url: String,
    pub scheme: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Mock REST API with auth and file uploads")]
pub struct Args {
    /// Host to bind to (overrides UPLOAD_API_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides UPLOAD_API_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Publicly served directory; files land under `<public-dir>/uploads`
    /// (overrides UPLOAD_API_PUBLIC_DIR)
    #[arg(long)]
    pub public_dir: Option<String>,

    /// Directory where multipart file parts are staged before relocation
    /// (overrides UPLOAD_API_STAGING_DIR)
    #[arg(long)]
    pub staging_dir: Option<String>,

    /// Database URL (overrides UPLOAD_API_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// URL scheme advertised in upload responses (overrides UPLOAD_API_SCHEME)
    #[arg(long)]
    pub scheme: Option<String>,

    /// Secret used to sign access tokens (overrides UPLOAD_API_JWT_SECRET)
    #[arg(long)]
    pub jwt_secret: Option<String>,

    /// Access token lifetime in seconds (overrides UPLOAD_API_TOKEN_TTL_SECS)
    #[arg(long)]
    pub token_ttl_secs: Option<i64>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("UPLOAD_API_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("UPLOAD_API_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing UPLOAD_API_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading UPLOAD_API_PORT"),
        };
        let env_public = env::var("UPLOAD_API_PUBLIC_DIR").unwrap_or_else(|_| "./public".into());
        let env_staging =
            env::var("UPLOAD_API_STAGING_DIR").unwrap_or_else(|_| "./data/tmp".into());
        let env_db = env::var("UPLOAD_API_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/upload_api.db".into());
        let env_scheme = env::var("UPLOAD_API_SCHEME").unwrap_or_else(|_| "http".into());
        let env_secret =
            env::var("UPLOAD_API_JWT_SECRET").unwrap_or_else(|_| "upload-api-dev-secret".into());
        let env_ttl = match env::var("UPLOAD_API_TOKEN_TTL_SECS") {
            Ok(value) => value
                .parse::<i64>()
                .with_context(|| format!("parsing UPLOAD_API_TOKEN_TTL_SECS value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3600,
            Err(err) => return Err(err).context("reading UPLOAD_API_TOKEN_TTL_SECS"),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            public_dir: args.public_dir.unwrap_or(env_public),
            staging_dir: args.staging_dir.unwrap_or(env_staging),
            database_url: args.database_url.unwrap_or(env_db),
            scheme: args.scheme.unwrap_or(env_scheme),
            jwt_secret: args.jwt_secret.unwrap_or(env_secret),
            token_ttl_secs: args.token_ttl_secs.unwrap_or(env_ttl),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
