//! HR Leave and Payroll Engine
//!
//! This crate provides leave accounting (leave type catalog, per-year leave
//! balances and the leave application workflow) and payroll computation
//! (salary structures, monthly payroll processing and payslip issue) over a
//! shared in-memory store with row-level locking.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod external;
pub mod leave;
pub mod models;
pub mod payroll;
pub mod service;
pub mod store;
