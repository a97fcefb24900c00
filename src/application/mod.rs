pub mod ledger;
pub mod shutdown;
pub mod worker;
