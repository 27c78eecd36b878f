//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/cartcalc/cartcalc.toml`
//! 3. Local config: `--config <file>`, or `./.cartcalc.toml` if present
//! 4. Environment variables: `CARTCALC__<SECTION>__<KEY>`, e.g. `CARTCALC__TAX__STANDARD_RATE`
//!
//! Every file layer only overrides the fields it names.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, IoResultExt};
use crate::domain::{DeliveryRates, DiscountRates, PriceBasis, TaxRates};

/// Name of the per-directory config file.
pub const LOCAL_CONFIG_FILE: &str = ".cartcalc.toml";

/// Raw delivery section; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawDeliveryRates {
    pub base_rate: Option<f64>,
    pub weight_rate: Option<f64>,
    pub fragile_surcharge: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawTaxRates {
    pub standard_rate: Option<f64>,
    pub reduced_rate: Option<f64>,
    pub luxury_rate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawDiscountRates {
    pub bulk_threshold: Option<f64>,
    pub bulk_rate: Option<f64>,
    pub seasonal_rate: Option<f64>,
    pub threshold_basis: Option<PriceBasis>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub delivery: RawDeliveryRates,
    pub tax: RawTaxRates,
    pub discount: RawDiscountRates,
}

/// Rates for all built-in visitors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub delivery: DeliveryRates,
    pub tax: TaxRates,
    pub discount: DiscountRates,
}

/// Get the XDG config directory for cartcalc.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cartcalc").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cartcalc.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).with_path_context("read config", path)?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        let (d, t, s) = (&overlay.delivery, &overlay.tax, &overlay.discount);
        Self {
            delivery: DeliveryRates {
                base_rate: d.base_rate.unwrap_or(self.delivery.base_rate),
                weight_rate: d.weight_rate.unwrap_or(self.delivery.weight_rate),
                fragile_surcharge: d
                    .fragile_surcharge
                    .unwrap_or(self.delivery.fragile_surcharge),
            },
            tax: TaxRates {
                standard_rate: t.standard_rate.unwrap_or(self.tax.standard_rate),
                reduced_rate: t.reduced_rate.unwrap_or(self.tax.reduced_rate),
                luxury_rate: t.luxury_rate.unwrap_or(self.tax.luxury_rate),
            },
            discount: DiscountRates {
                bulk_threshold: s.bulk_threshold.unwrap_or(self.discount.bulk_threshold),
                bulk_rate: s.bulk_rate.unwrap_or(self.discount.bulk_rate),
                seasonal_rate: s.seasonal_rate.unwrap_or(self.discount.seasonal_rate),
                threshold_basis: s
                    .threshold_basis
                    .unwrap_or(self.discount.threshold_basis),
            },
        }
    }

    /// Reject negative or non-finite rates.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.delivery.validate()?;
        self.tax.validate()?;
        self.discount.validate()?;
        Ok(())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit local config file; must exist when given.
    ///   Without it `./.cartcalc.toml` is used if present.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Local config
        match local {
            Some(path) => {
                debug!("local config: {}", path.display());
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                let default_local = Path::new(LOCAL_CONFIG_FILE);
                if default_local.exists() {
                    debug!("local config: {}", default_local.display());
                    current = current.merge_with(&load_raw_settings(default_local)?);
                }
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply CARTCALC__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("CARTCALC")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Some(val) = env_value(&config, "delivery.base_rate")? {
            settings.delivery.base_rate = val;
        }
        if let Some(val) = env_value(&config, "delivery.weight_rate")? {
            settings.delivery.weight_rate = val;
        }
        if let Some(val) = env_value(&config, "delivery.fragile_surcharge")? {
            settings.delivery.fragile_surcharge = val;
        }
        if let Some(val) = env_value(&config, "tax.standard_rate")? {
            settings.tax.standard_rate = val;
        }
        if let Some(val) = env_value(&config, "tax.reduced_rate")? {
            settings.tax.reduced_rate = val;
        }
        if let Some(val) = env_value(&config, "tax.luxury_rate")? {
            settings.tax.luxury_rate = val;
        }
        if let Some(val) = env_value(&config, "discount.bulk_threshold")? {
            settings.discount.bulk_threshold = val;
        }
        if let Some(val) = env_value(&config, "discount.bulk_rate")? {
            settings.discount.bulk_rate = val;
        }
        if let Some(val) = env_value(&config, "discount.seasonal_rate")? {
            settings.discount.seasonal_rate = val;
        }
        if let Some(val) = env_value::<PriceBasis>(&config, "discount.threshold_basis")? {
            settings.discount.threshold_basis = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# cartcalc configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/cartcalc/cartcalc.toml
#   Local:  --config <file> or ./.cartcalc.toml
#   Env:    CARTCALC__<SECTION>__<KEY>, e.g. CARTCALC__TAX__STANDARD_RATE=0.19

[delivery]
# base_rate = 100.0          # flat fee per item
# weight_rate = 50.0         # per kg
# fragile_surcharge = 200.0  # extra for fragile items

[tax]
# standard_rate = 0.20
# reduced_rate = 0.10        # food and books
# luxury_rate = 0.30

[discount]
# bulk_threshold = 10000.0
# bulk_rate = 0.10
# seasonal_rate = 0.05
# threshold_basis = "excl_packaging"   # or "incl_packaging"
"#
        .to_string()
    }
}

/// Read one override; an unset key is `None`, an unparsable one is an error.
fn env_value<T: DeserializeOwned>(
    config: &Config,
    key: &str,
) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("CARTCALC__{}: {e}", key.replace('.', "__").to_uppercase()),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
