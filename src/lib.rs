// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// Configuration module
///
/// Handles application settings and environment variables
pub mod config;

/// Domain module
///
/// Contains the core models and the tender-source contract
pub mod domain;

/// Infrastructure module
///
/// Portal integrations and the harvesting pipeline
pub mod infrastructure;

/// Presentation module
///
/// HTTP routing, handlers and request binding
pub mod presentation;

/// Report module
///
/// Renders the aggregated result set into a workbook
pub mod report;

/// Utility module
///
/// Telemetry initialization and shared helpers
pub mod utils;
