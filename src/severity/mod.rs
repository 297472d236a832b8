//! Severity classification module.
//!
//! Maps the analysis service's traffic-light status onto display metadata:
//! - `green` - serviceable
//! - `yellow` - maintenance required
//! - `red` - out of service
//! - `unknown` - anything else, including a missing status

pub mod mapper;

pub use mapper::*;
