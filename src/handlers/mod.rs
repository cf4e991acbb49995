pub mod audit;
pub mod catalog;
pub mod ledger;
pub mod legacy;
pub mod purchase;

pub use audit::audit_config;
pub use catalog::catalog_config;
pub use ledger::ledger_config;
pub use legacy::legacy_config;
pub use purchase::purchase_config;
