use std::sync::Arc;

use anyhow::Context;
use floor_client::client::{FloorApi, NetworkHttpClient};
use floor_client::schedule::{ScheduleCache, ScheduleKey, ScheduleRefresher, ScheduleState, fetch_grid};
use floor_client::{ClientConfig, logger};
use shared::timeslot::service_date_today;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境 (.env) + 配置 + 日志
    dotenv::dotenv().ok();
    let config = ClientConfig::from_env();
    logger::init_logger(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!(api = %config.base_url, "Floor watch starting...");

    // 2. 餐厅配置 → 时段网格
    let http = NetworkHttpClient::new(&config).context("failed to build HTTP client")?;
    let api = Arc::new(FloorApi::new(http));
    let (profile, grid) = fetch_grid(api.as_ref())
        .await
        .context("failed to load restaurant profile")?;
    let hours = profile.operating_hours()?;
    let date = service_date_today(hours, grid.timezone());
    let key = ScheduleKey::new(date, profile.timezone.clone());

    // 3. 首次加载并打印占用
    let cache = ScheduleCache::new();
    match cache.load(api.as_ref(), &grid, &key, config.load_strategy).await {
        Ok(schedule) => {
            println!("{} - {} ({})", profile.name, date, profile.timezone);
            for slot in schedule.occupancy() {
                println!(
                    "  {}  booked {:>2}  free {:>2}  blocked {:>2}  guests {:>3}",
                    slot.time, slot.booked, slot.free, slot.blocked, slot.guests
                );
            }
        }
        Err(e) => tracing::error!(error = %e, "Initial schedule load failed"),
    }

    // 4. 后台刷新直到 Ctrl-C
    let shutdown = CancellationToken::new();
    let refresher = ScheduleRefresher::new(
        api,
        cache.clone(),
        grid,
        key.clone(),
        config.load_strategy,
        config.refresh_period(),
        shutdown.clone(),
    );
    let task = tokio::spawn(refresher.run());

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    tracing::info!("Shutting down");
    shutdown.cancel();
    task.await.context("refresher task panicked")?;

    if let ScheduleState::Failed { error, .. } = cache.state(&key) {
        tracing::warn!(%error, "Last schedule refresh failed");
    }
    Ok(())
}
