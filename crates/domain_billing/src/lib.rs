//! Billing Domain - Time Records and Closure
//!
//! Consultants record time against project activities, daily or as a
//! weekly grid. Approved records that have not yet been billed are
//! consumed by the **billing closure**: grouped by client and
//! consultant, each group becomes one invoice (a line item per time
//! record), one receivable against the client, and one payable to the
//! consultant's supplier. A closure over a period with nothing approved
//! and unbilled emits nothing.

pub mod time_record;
pub mod closure;
pub mod error;

pub use time_record::{TimeRecord, TimeRecordKind, TimeRecordStatus, WeekHours};
pub use closure::{
    ClosureAggregator, ClosureFilter, ClosureGroup, ClosureOutcome, InvoiceNumberSequence,
};
pub use error::BillingError;
