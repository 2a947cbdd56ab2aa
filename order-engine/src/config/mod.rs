//! Configuration module for order-engine.

use service_core::config as core_config;
use service_core::error::AppError;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::models::MeasurementCatalog;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub shop: ShopConfig,
    /// JSON catalog replacing the built-in garment list.
    pub measurement_catalog_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ShopConfig {
    pub name: String,
    pub currency_symbol: String,
}

impl EngineConfig {
    /// `CONFIG_FILE` names an explicit base configuration file; otherwise
    /// an optional `configuration.*` in the working directory is used.
    pub fn from_env() -> Result<Self, AppError> {
        let common = match env::var("CONFIG_FILE") {
            Ok(path) if !path.trim().is_empty() => {
                core_config::Config::load_from(Path::new(&path))?
            }
            _ => core_config::Config::load()?,
        };
        let measurement_catalog_path = env::var("MEASUREMENT_CATALOG_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        if common.is_prod() && env::var("SHOP_NAME").is_err() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SHOP_NAME is required in production but not set"
            )));
        }

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "order-engine".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            shop: ShopConfig {
                name: env::var("SHOP_NAME").unwrap_or_else(|_| "Our Shop".to_string()),
                currency_symbol: env::var("CURRENCY_SYMBOL").unwrap_or_else(|_| "₹".to_string()),
            },
            measurement_catalog_path,
        })
    }

    /// Configured catalog, or the built-in one when no path is set.
    pub fn measurement_catalog(&self) -> Result<MeasurementCatalog, EngineError> {
        match &self.measurement_catalog_path {
            Some(path) => MeasurementCatalog::load(path),
            None => Ok(MeasurementCatalog::builtin().clone()),
        }
    }

    /// Render values every message gets regardless of order.
    pub fn shop_context(&self) -> HashMap<String, String> {
        HashMap::from([("shopName".to_string(), self.shop.name.clone())])
    }
}
