//! Application configuration
//!
//! Built once at startup from the environment (with optional `.env`) and
//! passed explicitly into the server builder. Nothing else in the crate
//! reads environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the SQLite database file.
    pub database_path: PathBuf,
    /// Socket the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// HMAC secret used to sign bearer tokens.
    pub jwt_secret: String,
    /// Value emitted in `Access-Control-Allow-Origin`.
    pub cors_origin: String,
    /// bcrypt work factor for password hashing.
    pub bcrypt_cost: u32,
}

impl AppConfig {
    /// Load configuration from `STUDYTRACK_*` environment variables.
    ///
    /// `STUDYTRACK_JWT_SECRET` is mandatory; everything else has a default.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .set_default("database_path", "studytrack.db")?
            .set_default("bind_addr", "127.0.0.1:8080")?
            .set_default("cors_origin", "*")?
            .set_default("bcrypt_cost", 12i64)?
            .add_source(config::Environment::with_prefix("STUDYTRACK"))
            .build()
            .context("failed to read configuration from environment")?;

        let jwt_secret = cfg
            .get_string("jwt_secret")
            .context("server misconfiguration: STUDYTRACK_JWT_SECRET is missing")?;

        let bind_addr: SocketAddr = cfg
            .get_string("bind_addr")?
            .parse()
            .context("invalid STUDYTRACK_BIND_ADDR")?;

        let bcrypt_cost = cfg.get_int("bcrypt_cost")? as u32;

        Ok(AppConfig {
            database_path: PathBuf::from(cfg.get_string("database_path")?),
            bind_addr,
            jwt_secret,
            cors_origin: cfg.get_string("cors_origin")?,
            bcrypt_cost,
        })
    }
}
