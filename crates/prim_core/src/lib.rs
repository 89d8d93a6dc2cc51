//! Host-side core of the parallel-primitive parity harness, independent of any GPU backend.
//!
//! - deterministic input generation ([`random`])
//! - sequential reference scans ([`scan`])
//! - the [`CustomPair`] payload type used to stress non-primitive data
//! - the tolerance oracle that decides whether device output matches ([`oracle`])

pub mod config;
pub mod custom;
pub mod element;
pub mod launch;
pub mod oracle;
pub mod random;
pub mod scan;

pub use custom::CustomPair;
pub use element::{Native, ReducedFloat, Scalar};
pub use half::{bf16, f16};
pub use oracle::{Comparable, Report, ResultSink};
pub use random::{random_data, random_data01, random_value, RandomData};
pub use scan::{host_exclusive_scan, host_exclusive_scan_by_key, host_inclusive_scan};
