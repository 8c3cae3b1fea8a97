//! Helpers for putting API text on a terminal and handing links to the
//! system browser.

mod text;
mod url_validator;

pub use text::{clean_line, display_width, truncate_to_width};
pub use url_validator::{validate_url_for_open, UrlValidationError};
