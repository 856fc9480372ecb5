// Route path constants - single source of truth for all API paths

pub const HEALTH: &str = "/health";
pub const RECORDS: &str = "/records";
