pub mod claims;
pub mod codec;
pub mod config;
pub mod error;

pub use claims::{Audience, Claims, TokenPair, TokenType};
pub use codec::{DenylistCheck, JwtCodec, TokenOptions};
pub use config::{is_symmetric, AuthConfig, AuthConfigBuilder, Expiry};
pub use error::{AuthError, AuthResult};
