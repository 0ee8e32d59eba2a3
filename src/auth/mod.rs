mod claims;
pub(crate) mod extractors;
pub mod jwt;

pub use claims::{Claims, TokenKind};
pub use extractors::AuthUser;
