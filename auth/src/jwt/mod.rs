pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::TokenClaims;
pub use claims::TokenKind;
pub use errors::JwtError;
pub use handler::JwtHandler;
