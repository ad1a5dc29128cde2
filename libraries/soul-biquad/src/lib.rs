//! Fixed-point biquad cascade for Soul Player
//!
//! This crate provides:
//! - Q30 multiply and multiply-accumulate with defined rounding and checked bounds
//! - 32-bit output saturation with countable clamp events
//! - A cascade of second-order sections driven by one shared recurrence
//! - A double-precision reference kernel for differential testing
//! - Test vector rendering for firmware and hardware benches
//!
//! # Architecture
//!
//! ```text
//! CascadeConfig (JSON / builtin)
//!        |
//!        v  quantize_q30
//! Cascade<FixedQ30> ----+---- Cascade<FloatReference>
//!   |                   |           |
//!   |  apply_cascade    |           |  apply_cascade
//!   v                   |           v
//! Section -> Section -> ...       Section -> Section -> ...
//!   |                                |
//!   SectionKernel::apply_section  (shared recurrence)
//!   |
//!   macc_q30 / saturate32 + SaturationMonitor
//! ```
//!
//! # Example
//!
//! ```
//! use soul_biquad::{Cascade, CascadeConfig};
//!
//! # fn example() -> soul_biquad::Result<()> {
//! let mut cascade = Cascade::fixed(&CascadeConfig::notch_bank_with_low_shelf())?;
//! let y = cascade.apply_cascade(1 << 20)?;
//! println!("y = {y}, saturations = {}", cascade.saturation_events());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod accuracy;
mod cascade;
mod config;
mod error;
pub mod fixture;
pub mod q30;
mod saturation;
mod section;
pub mod stimulus;

pub use accuracy::{compare, DifferentialReport};
pub use cascade::{Cascade, Section};
pub use config::{CascadeConfig, SectionConfig, SectionKind};
pub use error::{ArithOp, BiquadError, Result};
pub use fixture::TestVector;
pub use q30::{macc_q30, mul_q30, saturate32, CheckMode};
pub use saturation::{Clamp, SaturationMonitor};
pub use section::{
    Coefficients, FixedQ30, FloatReference, Sample, SectionKernel, SectionState,
};
