//! Configuration management for maptile-streamer.
//!
//! Configuration comes from command-line arguments via clap, with environment
//! variable overrides under the `MAPTILE_` prefix and sensible defaults for
//! everything except the bucket name.
//!
//! # Environment Variables
//!
//! - `MAPTILE_HOST` - Server bind address (default: 0.0.0.0)
//! - `MAPTILE_PORT` - Server port (default: 8080)
//! - `MAPTILE_BUCKET` - Bucket containing the tile objects (required)
//! - `MAPTILE_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `MAPTILE_S3_REGION` - AWS region (default: us-east-1)
//! - `MAPTILE_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `MAPTILE_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default HTTP cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// CLI Arguments
// =============================================================================

/// maptile-streamer - a read-only map tile server backed by object storage.
///
/// Serves map tiles, configuration documents and coordinate transforms from
/// an S3 or S3-compatible bucket. No local tile storage required.
#[derive(Parser, Debug)]
#[command(name = "maptile-streamer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Consume the CLI into its parsed command.
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the tile server
    Serve(ServeConfig),

    /// Check configuration and bucket connectivity
    Check(CheckConfig),
}

/// Configuration for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "MAPTILE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "MAPTILE_PORT")]
    pub port: u16,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Bucket containing the tile objects.
    #[arg(long, env = "MAPTILE_BUCKET")]
    pub bucket: String,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    ///
    /// If not specified, uses the default AWS S3 endpoint.
    #[arg(long, env = "MAPTILE_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "MAPTILE_S3_REGION")]
    pub s3_region: String,

    // =========================================================================
    // HTTP Configuration
    // =========================================================================
    /// HTTP Cache-Control max-age in seconds for tile and config responses.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "MAPTILE_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "MAPTILE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.is_empty() {
            return Err("bucket name is required. Set --bucket or MAPTILE_BUCKET".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration for the `check` command.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    /// Bucket containing the tile objects.
    #[arg(long, env = "MAPTILE_BUCKET")]
    pub bucket: String,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    #[arg(long, env = "MAPTILE_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "MAPTILE_S3_REGION")]
    pub s3_region: String,

    /// List the map namespaces found in the bucket.
    #[arg(long, default_value_t = false)]
    pub list_maps: bool,

    /// Verify that a specific storage key exists.
    #[arg(long)]
    pub test_key: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
