//! The Rollcall reconciliation pipeline.
//!
//! Takes a batch of raw external person records and reconciles them into the
//! store's user / organisational-unit / membership model:
//!
//! 1. normalize each record through the configured feed adapter,
//! 2. resolve the record's delimited org path into a unit chain
//!    (create-or-reuse per level),
//! 3. upsert the subject user, then resolve and link the supervisor,
//! 4. assert the user's unit membership,
//! 5. after the whole batch, emit exactly two change events to the rule
//!    engine.
//!
//! Records are processed strictly in input order; later records may reuse
//! units created by earlier ones, so the single shared store handle is the
//! ordering contract. Per-record failures are contained; the batch always
//! runs to completion.

pub mod batch;
pub mod changes;
pub mod error;
pub mod memory;
pub mod notify;
pub mod person;
pub mod supervisor;
pub mod units;

pub use batch::{ImportOptions, ImportPipeline, ImportReport, RecordFailure};
pub use changes::ChangeSet;
pub use error::{Error, Result};
