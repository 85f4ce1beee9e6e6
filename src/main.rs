// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use attendrs::config::settings::Settings;
use attendrs::domain::services::extraction_gateway::{ExtractionGateway, GatewayConfig};
use attendrs::infrastructure::inference::gemini_client::GeminiClient;
use attendrs::infrastructure::metrics;
use attendrs::presentation::routes;
use attendrs::utils::telemetry;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Arc::new(Settings::new()?);

    // 2. Initialize logging
    telemetry::init_telemetry(settings.server.is_production());
    info!("Starting attendrs...");
    info!(
        environment = %settings.server.environment,
        model = %settings.model.name,
        prompt = settings.prompt.template.as_str(),
        record_mode = settings.extraction.record_mode.as_str(),
        "Configuration loaded"
    );

    if settings.metrics.enabled {
        metrics::init_metrics(&settings.metrics.listen_addr);
    }

    // 3. Build the extraction gateway
    let config = GatewayConfig::from_settings(&settings);
    match &config.credential {
        Some(key) => info!(api_key = %key, "Upstream API key configured"),
        None => warn!("No upstream API key configured; /api/process-image will fail until one is set"),
    }

    let client = GeminiClient::new(
        &config.model_endpoint,
        &config.model,
        // The gateway enforces the per-attempt deadline; this only bounds stray connections
        config.timeout + Duration::from_secs(5),
    )?;
    let gateway = Arc::new(ExtractionGateway::new(config, Arc::new(client)));

    // 4. Start HTTP server
    let app = routes::app(gateway, settings.clone());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
