pub mod accounts;
pub mod audit_records;
pub mod boxes;
pub mod draw_sessions;
pub mod ledger_entries;
pub mod prizes;

pub use accounts as account_entity;
pub use audit_records as audit_record_entity;
pub use boxes as box_entity;
pub use draw_sessions as draw_session_entity;
pub use ledger_entries as ledger_entry_entity;
pub use prizes as prize_entity;

pub use accounts::AccountMode;
pub use audit_records::AuditStatus;
pub use draw_sessions::DrawSessionState;
pub use ledger_entries::LedgerEntryKind;
