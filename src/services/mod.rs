pub mod audit_service;
pub mod catalog_service;
pub mod draw_engine;
pub mod ledger_service;
pub mod legacy_purchase_service;
pub mod purchase_service;

pub use audit_service::*;
pub use catalog_service::*;
pub use ledger_service::*;
pub use legacy_purchase_service::*;
pub use purchase_service::*;
