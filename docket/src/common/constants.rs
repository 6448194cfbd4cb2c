// doc constants
pub const DOC_ID: &str = "_id";
pub const FIELD_SEPARATOR: char = '.';

// collection constants
pub const RESERVED_NAME_PREFIX: &str = "$";
pub const MAX_INDEXES: usize = 6;

// engine defaults
pub const DEFAULT_SCAN_BATCH_SIZE: usize = 100;
pub const DEFAULT_MAX_UPDATE_ATTEMPTS: u32 = 16;
