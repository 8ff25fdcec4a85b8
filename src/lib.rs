//! Institute Rules Engine
//!
//! This crate provides the business rules of an educational institute's back
//! office: invoice totals with GST, internship pricing, the attendance day
//! state machine, leave balances and monthly payroll settlement.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
