//! Core data models for the Institute Rules Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod audit;
mod invoice;
mod leave;
mod salary;

pub use attendance::{
    ApprovalStatus, AttendanceMark, AttendanceRecord, AttendanceState, CorrectionCounter, state_of,
};
pub use audit::{AuditStep, AuditTrace, AuditWarning};
pub use invoice::{Invoice, InvoiceItem, InvoiceKind, InvoiceStatus, InvoiceTotals};
pub use leave::{LeaveBalance, LeaveKind, LeaveRequest, LeaveStatus, LeaveType};
pub use salary::{SalarySlip, SalaryStructure};
