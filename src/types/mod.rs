pub mod analysis;
pub mod domain;
pub mod error;
pub mod utils;

pub use analysis::*;
pub use domain::*;
pub use error::{
    AgriError, ErrorCategory, ErrorClassifier, LlmError, Result, ResultExt, ValidationError,
};
pub use utils::{
    ParseWithDefault, format_quantity, group_thousands, json_number, json_string,
    json_string_array, json_string_or, log_filter_warn, round_to,
};
