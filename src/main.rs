// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tendrs::config::settings::Settings;
use tendrs::infrastructure::harvest::aggregator::SourceAggregator;
use tendrs::infrastructure::harvest::orchestrator::CategoryOrchestrator;
use tendrs::infrastructure::harvest::record_filter::load_exclusion_pattern;
use tendrs::infrastructure::harvest::retry::RetryPolicy;
use tendrs::infrastructure::sources::gov_portal::GovPortalSource;
use tendrs::infrastructure::sources::sber_ast::SberAstSource;
use tendrs::presentation::handlers::tender_handler::AppState;
use tendrs::presentation::routes;
use tendrs::utils::telemetry;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting tendrs...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Compile the title-exclusion pattern
    let pattern = Arc::new(load_exclusion_pattern(Path::new(
        &settings.harvest.exclude_file,
    ))?);
    info!(file = %settings.harvest.exclude_file, "Exclusion pattern compiled");

    // 4. Initialize sources and the harvesting pipeline
    let gov = Arc::new(GovPortalSource::new(settings.harvest.enrich_regions));
    let sber = Arc::new(SberAstSource::new());

    let policy = RetryPolicy {
        page_delay: Duration::from_millis(settings.harvest.page_delay_ms),
        ..RetryPolicy::standard()
    };
    let orchestrator = Arc::new(CategoryOrchestrator::new(policy, pattern));
    let aggregator = Arc::new(SourceAggregator::new(gov, sber, orchestrator));

    // 5. Build the router and serve
    let state = AppState {
        aggregator,
        settings: settings.clone(),
    };
    let app = routes::tender_router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
