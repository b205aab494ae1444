// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub harvest: HarvestSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct HarvestSettings {
    /// Plain-text file with one title-exclusion regex fragment per line,
    /// compiled once at startup.
    pub exclude_file: String,
    /// Secondary detail-page fetch for the delivery region on the HTML
    /// portal. Multiplies request count, so off by default.
    pub enrich_regions: bool,
    /// Delay between successive pages of one query, in milliseconds.
    pub page_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct ReportSettings {
    /// Where the generated workbook is written.
    pub output_file: String,
}

impl Settings {
    /// Load configuration: defaults, then optional `config/{env}` files,
    /// then `TENDRS__`-prefixed environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("harvest.exclude_file", "config/exclude.txt")?
            .set_default("harvest.enrich_regions", false)?
            .set_default("harvest.page_delay_ms", 1000)?
            .set_default("report.output_file", "Закупки.xlsx")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("TENDRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
