pub mod extractor;
pub mod jwt;
pub mod test_utils;

pub use extractor::{auth_middleware, extract_user, require_role};
pub use jwt::{validate_token, TokenError};
