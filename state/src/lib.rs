pub mod ledger;
pub mod store;

pub use ledger::{FillLedger, FillRecord, RevertRecord, SqliteFillLedger};
pub use store::{CommitError, CommitOutcome, MakerStats, StateStore, StoreView};
