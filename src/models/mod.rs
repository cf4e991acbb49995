pub mod audit;
pub mod catalog;
pub mod common;
pub mod ledger;
pub mod legacy;
pub mod pagination;
pub mod purchase;

pub use audit::*;
pub use catalog::*;
pub use common::*;
pub use ledger::*;
pub use legacy::*;
pub use pagination::*;
pub use purchase::*;
