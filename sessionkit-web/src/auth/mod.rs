//! Session credentials: issuing, verifying, delivering and renewing them

pub mod codec;
pub mod delivery;
pub mod extractors;
pub mod password;
pub mod session;

pub use codec::{AccessClaims, CredentialCodec, IssuedAccess, Verification};
pub use delivery::{DeliveryResult, REFRESH_TOKEN_LIFETIME_DAYS};
pub use extractors::AuthenticatedUser;
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use session::SessionService;
