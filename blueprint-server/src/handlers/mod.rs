pub mod decision_handlers;
pub mod event_handlers;
pub mod scan_handlers;
