pub mod export;
pub mod grouping;
pub mod scope;

pub use export::to_csv;
pub use grouping::{COOLDOWN_MS, SESSION_GAP_MS, group_sessions, numbered_sessions};
pub use scope::{Actor, LEGACY_SUBJECT, is_visible, scope_results};
