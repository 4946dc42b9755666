//! Parallel archive extraction
//!
//! ```text
//!                   ┌──────────────────────────┐
//!                   │   ExtractCoordinator     │
//!                   │  - list *.zip            │
//!                   │  - seed + close queue    │
//!                   └────────────┬─────────────┘
//!                                │
//!       ┌────────────────────────┼────────────────────────┐
//!       │                        │                        │
//! ┌─────▼─────┐            ┌─────▼─────┐            ┌─────▼─────┐
//! │  Worker 1 │            │  Worker 2 │            │  Worker N │
//! │  unzip    │            │  unzip    │            │  unzip    │
//! └─────┬─────┘            └─────┬─────┘            └─────┬─────┘
//!       └────────────────────────┼────────────────────────┘
//!                                ▼
//!                     shared output folder
//! ```
//!
//! N is the number of available CPUs, capped at the number of archives.

pub mod coordinator;
pub mod queue;
pub mod worker;

pub use coordinator::{ExtractCoordinator, ExtractResult};
pub use worker::extract_archive;
