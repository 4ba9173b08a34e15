//! maptile-streamer - a read-only map tile server backed by object storage.
//!
//! This binary starts the HTTP server and wires up all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use maptile_streamer::{
    config::{CheckConfig, Cli, Command, ServeConfig},
    server::{create_router, RouterConfig},
    store::{create_s3_client, S3TileStore},
    tile::TileResolver,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("maptile-streamer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  bucket: {}", config.bucket);
    if let Some(ref endpoint) = config.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", config.s3_region);
    info!("  cache max-age: {}s", config.cache_max_age);

    let s3_client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;

    info!("Connecting to object storage...");
    match probe_bucket(&s3_client, &config.bucket).await {
        Ok(()) => {
            info!("  bucket '{}' is reachable", config.bucket);
        }
        Err(e) => {
            error!("  failed to reach bucket '{}': {}", config.bucket, e);
            error!("");
            error!("  Please check:");
            error!("    - Your AWS credentials are configured correctly");
            error!("    - The bucket '{}' exists and is accessible", config.bucket);
            error!("    - The S3 endpoint is correct (if using MinIO/custom S3)");
            return ExitCode::FAILURE;
        }
    }

    let store = S3TileStore::new(s3_client, config.bucket.clone());
    let resolver = TileResolver::new(store);
    let router = create_router(resolver, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("Server listening on: http://{}", addr);
    info!("  tile:   /map/{{mapname}}/{{style}}/{{level}}/{{col}}/{{row}}/tile.png");
    info!("  maps:   /maps/");
    info!("  config: /mapconfig/{{mapname}}/{{configuration}}");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Probe bucket reachability with a minimal listing request.
async fn probe_bucket(client: &aws_sdk_s3::Client, bucket: &str) -> Result<(), String> {
    client
        .list_objects_v2()
        .bucket(bucket)
        .max_keys(1)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "maptile_streamer=debug,tower_http=debug"
    } else {
        "maptile_streamer=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("maptile-streamer configuration check");
    println!("════════════════════════════════════");
    println!();

    if config.bucket.is_empty() {
        println!("✗ Bucket: not set (use --bucket or MAPTILE_BUCKET)");
        return ExitCode::FAILURE;
    }
    println!("✓ Bucket: {}", config.bucket);

    if let Some(ref endpoint) = config.s3_endpoint {
        println!("✓ Endpoint: {}", endpoint);
    }
    println!("✓ Region: {}", config.s3_region);
    println!();

    print!("Testing bucket connection... ");

    let s3_client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;

    match probe_bucket(&s3_client, &config.bucket).await {
        Ok(()) => {
            println!("✓ success");
        }
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", e);
            println!();
            println!("Please check:");
            println!("  - Your AWS credentials are configured correctly");
            println!("  - The bucket '{}' exists and is accessible", config.bucket);
            if config.s3_endpoint.is_some() {
                println!("  - The S3 endpoint is correct and reachable");
            }
            return ExitCode::FAILURE;
        }
    }

    let store = S3TileStore::new(s3_client.clone(), config.bucket.clone());
    let resolver = TileResolver::new(store);

    if config.list_maps {
        println!();
        println!("Maps in bucket:");
        println!("───────────────");

        match resolver.list_maps().await {
            Ok(maps) => {
                if maps.is_empty() {
                    println!("  (no maps found)");
                } else {
                    for map in &maps {
                        println!("  {}", map);
                    }
                    println!();
                    println!("Total: {} map(s)", maps.len());
                }
            }
            Err(e) => {
                println!("  Error listing maps: {}", e);
            }
        }
    }

    if let Some(ref key) = config.test_key {
        println!();
        print!("Testing key '{}'... ", key);

        match s3_client
            .head_object()
            .bucket(&config.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(result) => {
                println!("✓ found");
                if let Some(size) = result.content_length() {
                    println!("  Size: {} bytes", size);
                }
                if let Some(content_type) = result.content_type() {
                    println!("  Content-Type: {}", content_type);
                }
            }
            Err(_) => {
                println!("✗ not found");
                println!();
                println!("  The key '{}' does not exist in the bucket.", key);
                return ExitCode::FAILURE;
            }
        }
    }

    println!();
    println!("════════════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
