use std::path::Path;

use tracing::info;

use vsrv_cache::RedisCache;
use vsrv_core::{init_tracing, CoreConfig};
use vsrv_media::{check_ffmpeg, check_ffprobe};
use vsrv_storage::S3BlobStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = CoreConfig::from_env()?;

    info!(
        work_dir = %config.work_dir.display(),
        policy = %config.cache_failure_policy,
        "vsrv-selfcheck: starting"
    );
    ensure_workdir(&config.work_dir).await?;
    ensure_binaries(&config)?;
    ensure_redis(&config.redis_url).await?;
    ensure_storage(&config.clip_bucket).await?;

    info!("vsrv-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

fn ensure_binaries(config: &CoreConfig) -> anyhow::Result<()> {
    let ffmpeg = check_ffmpeg(&config.ffmpeg_path)?;
    info!(path = %ffmpeg.display(), "ffmpeg found");

    if config.verify_clip_bounds {
        let ffprobe = check_ffprobe(&config.ffprobe_path)?;
        info!(path = %ffprobe.display(), "ffprobe found");
    }
    Ok(())
}

async fn ensure_redis(url: &str) -> anyhow::Result<()> {
    let cache = RedisCache::new(&vsrv_cache::RedisConfig {
        redis_url: url.to_string(),
    })?;
    cache
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("redis not reachable at {}: {}", url, e))?;
    Ok(())
}

async fn ensure_storage(bucket: &str) -> anyhow::Result<()> {
    let store = S3BlobStore::from_env()?;
    store
        .check_connectivity(bucket)
        .await
        .map_err(|e| anyhow::anyhow!("clip bucket {} not reachable: {}", bucket, e))?;
    info!(bucket, "clip bucket reachable");
    Ok(())
}
