//! # Pact Kernel
//!
//! A promise-satisfaction engine: components **want** behaviors and
//! **provide** behaviors (possibly conditioned on further behaviors),
//! and the resolver explains, as a tree, whether each wanted behavior
//! is satisfiable by the registered population.
//!
//! The crate is pure and synchronous: no I/O, no clocks, no global
//! state. Every failure mode is data — a bare leaf, a failing offer,
//! a cycle path, a diagnostic — never a panic or an error return on
//! the query path.
//!
//! ## Architecture
//!
//! ```text
//! Behavior              ← A named capability + condition names
//!     │
//! Component             ← wants + provides, variants merged by name
//!     │
//! Collective            ← Named grouping: flat fold or tagged instances
//!     │
//! Registry              ← raw variants + collectives → working table
//!     │
//! Resolution / Offer    ← OR across providers, AND across conditions
//!     │
//! WantReport            ← Every want resolved, counted, explained
//! ```

pub mod behavior;
pub mod collective;
pub mod component;
pub mod diagnostic;
pub mod error;
pub mod registry;
pub mod report;
pub mod resolution;
pub mod resolve;

pub use behavior::{Behavior, TAG_SEPARATOR};
pub use collective::{Collective, Instance, Record};
pub use component::{Component, ContentHash};
pub use diagnostic::{Diagnostic, failure_class};
pub use error::{PactError, is_valid_name, validate_name};
pub use registry::{BehaviorProvider, Registry};
pub use report::{WANT_REPORT_KIND, WantFinding, WantReport, WantSummary, check_wants};
pub use resolution::{Offer, Resolution, Verdict};
