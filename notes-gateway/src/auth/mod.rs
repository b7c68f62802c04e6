//! Identity & session: credential digests, signed tokens and the request
//! extractor that gates every notes route.

mod extract;
mod identity;
mod password;
mod token;

pub use extract::CurrentUser;
pub use identity::{AuthSession, AuthenticatedUser, IdentityService, LoginRequest, RegisterRequest};
pub use password::CredentialHasher;
pub use token::{Claims, TOKEN_TTL_DAYS, TokenError, TokenSigner};
