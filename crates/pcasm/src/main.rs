use std::sync::Arc;

use pcasm_core::{
    config::{Config, EngineKind},
    engine::{BuildEngine, DatasetEngine},
};
use pcasm_market::{MarketAssembler, YandexMarketClient};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), pcasm_core::Error> {
    pcasm_core::logging::init("pcasm")?;

    let cfg = Arc::new(Config::load()?);

    let engine: Arc<dyn BuildEngine> = match cfg.engine {
        EngineKind::Dataset => {
            info!(
                "Using parts dataset from {}",
                cfg.component_data_dir.display()
            );
            Arc::new(DatasetEngine::new(
                cfg.component_data_dir.clone(),
                cfg.usd_rub_rate,
            ))
        }
        EngineKind::Market => {
            let client = YandexMarketClient::new(&cfg.market)?;
            if client.is_mock() {
                info!("Yandex Market client running in mock mode");
            }
            Arc::new(MarketAssembler::new(client, cfg.usd_rub_rate))
        }
    };

    pcasm_telegram::router::run_polling(cfg, engine)
        .await
        .map_err(|e| pcasm_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
