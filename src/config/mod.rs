//! Configuration loading and management for the Institute Rules Engine.
//!
//! This module loads the internship pricing table, GST rates and the
//! attendance, leave and payroll policies from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use institute_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/institute").unwrap();
//! println!("Currency: {}", config.config().tax().currency);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub(crate) use loader::find_domain;
pub use types::{
    AttendancePolicy, DomainRates, InstituteConfig, LeavePolicy, PayrollPolicy, PolicyConfig,
    PricingConfig, TaxConfig,
};
