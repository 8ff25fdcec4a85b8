//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading institute
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{
    AttendancePolicy, DomainRates, InstituteConfig, LeavePolicy, PolicyConfig, PricingConfig,
    TaxConfig,
};

/// Loads and provides access to institute configuration.
///
/// # Directory Structure
///
/// ```text
/// config/institute/
/// ├── pricing.yaml   # Internship fees by domain
/// ├── tax.yaml       # SGST/CGST rates
/// └── policy.yaml    # Attendance, leave and payroll rules
/// ```
///
/// # Example
///
/// ```no_run
/// use institute_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/institute").unwrap();
/// let rates = loader.get_domain_rates("AI/ML").unwrap();
/// println!("AI/ML three months: {}", rates.three_months);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: InstituteConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any required file is missing or contains invalid YAML.
    ///
    /// ```no_run
    /// use institute_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/institute")?;
    /// # Ok::<(), institute_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let pricing = Self::load_yaml::<PricingConfig>(&path.join("pricing.yaml"))?;
        let tax = Self::load_yaml::<TaxConfig>(&path.join("tax.yaml"))?;
        let policy = Self::load_yaml::<PolicyConfig>(&path.join("policy.yaml"))?;

        if pricing.domains.is_empty() {
            return Err(EngineError::ConfigParseError {
                path: path.join("pricing.yaml").display().to_string(),
                message: "no internship domains configured".to_string(),
            });
        }

        Ok(Self {
            config: InstituteConfig::new(pricing, tax, policy),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying institute configuration.
    pub fn config(&self) -> &InstituteConfig {
        &self.config
    }

    /// Returns the configured internship domains in sorted order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.config.pricing().domains.keys().map(String::as_str)
    }

    /// Gets the fee rates for an internship domain.
    ///
    /// An exact match wins; otherwise the domain is compared ignoring case and
    /// surrounding whitespace.
    pub fn get_domain_rates(&self, domain: &str) -> EngineResult<&DomainRates> {
        find_domain(self.config.pricing(), domain).map(|(_, rates)| rates)
    }

    /// Returns the attendance policy.
    pub fn attendance(&self) -> &AttendancePolicy {
        self.config.attendance()
    }

    /// Returns the leave policy.
    pub fn leave(&self) -> &LeavePolicy {
        self.config.leave()
    }
}

/// Finds a domain in the pricing table, returning its canonical name and rates.
pub(crate) fn find_domain<'a>(
    pricing: &'a PricingConfig,
    domain: &str,
) -> EngineResult<(&'a str, &'a DomainRates)> {
    if let Some((name, rates)) = pricing.domains.get_key_value(domain) {
        return Ok((name.as_str(), rates));
    }

    let wanted = domain.trim();
    pricing
        .domains
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .map(|(name, rates)| (name.as_str(), rates))
        .ok_or_else(|| EngineError::DomainNotFound {
            domain: domain.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/institute"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.config().tax().currency, "INR");
        assert_eq!(loader.domains().count(), 7);
    }

    #[test]
    fn test_get_domain_rates_for_ai_ml() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let rates = loader.get_domain_rates("AI/ML").unwrap();
        assert_eq!(rates.one_month, dec("1900"));
        assert_eq!(rates.three_months, dec("2900"));
    }

    #[test]
    fn test_get_domain_rates_ignores_case_and_whitespace() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let rates = loader.get_domain_rates("  cyber security ").unwrap();
        assert_eq!(rates.one_month, dec("2200"));
    }

    #[test]
    fn test_unknown_domain_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        match loader.get_domain_rates("BLOCKCHAIN") {
            Err(EngineError::DomainNotFound { domain }) => assert_eq!(domain, "BLOCKCHAIN"),
            other => panic!("Expected DomainNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_tax_rates_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let tax = loader.config().tax();
        assert_eq!(tax.sgst_rate, dec("0.09"));
        assert_eq!(tax.cgst_rate, dec("0.09"));
        assert_eq!(tax.combined_rate(), dec("0.18"));
    }

    #[test]
    fn test_policy_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let attendance = loader.attendance();
        assert_eq!(
            attendance.late_after,
            NaiveTime::from_hms_opt(10, 45, 0).unwrap()
        );
        assert_eq!(attendance.late_strike_limit, 3);
        assert_eq!(attendance.minimum_hours, dec("4"));
        assert_eq!(attendance.monthly_correction_limit, 4);

        assert_eq!(loader.leave().cl_per_month, dec("1.0"));
        assert_eq!(loader.leave().sl_per_month, dec("0.5"));

        let salary = &loader.config().payroll().default_salary;
        assert_eq!(salary.basic, dec("15000"));
        assert_eq!(salary.professional_tax, dec("200"));
        assert_eq!(salary.tds, Decimal::ZERO);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        match ConfigLoader::load("/nonexistent/path") {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("pricing.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }
}
