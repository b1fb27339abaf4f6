//! JWT token encoding, decoding, and revocation.

pub mod claims;
pub mod decoder;
pub mod encoder;
pub mod revocation;

pub use claims::{Claims, TokenType};
pub use decoder::{JwtDecoder, TokenError};
pub use encoder::{JwtEncoder, TokenPair};
pub use revocation::RevocationList;
