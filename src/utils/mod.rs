pub mod code_generator;
pub mod date_range;
pub mod ip;

pub use code_generator::{generate_code, is_valid_short_code, DEFAULT_CODE_LENGTH};
pub use date_range::DateRange;
