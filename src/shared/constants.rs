/// Capacity of the in-process change feed channel
pub const CHANGE_FEED_CAPACITY: usize = 256;

/// Action name recorded in the security audit log by the notification function
pub const AUDIT_ACTION_SEND_TECH_SHEET: &str = "send_tech_sheet_request";
