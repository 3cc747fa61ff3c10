/**
 * Folding share tokens and bearer credentials
 *  into the identity a request acts under.
 */
pub mod access;
pub mod content;
/**
 * Issuing and verifying bearer credentials.
 */
pub mod credential;
pub mod owner;
/**
 * Public share links: tokens, the provider
 *  trait, and an in-memory provider.
 */
pub mod share;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::access::{resolve_access, AccessError, EffectiveAccess};
    pub use crate::content::{Attribution, ContentType, ContentTypeError, ContentTypeRegistry};
    pub use crate::credential::{CredentialError, CredentialVerifier, JwtAuthority};
    pub use crate::owner::OwnerId;
    pub use crate::share::{
        MemoryShareLinkProvider, ShareLinkError, ShareLinkProvider, ShareToken, SharingFlags,
    };
    pub use crate::version::build_info;
}
