//! Public share links.
//!
//! An owner publishes their collection by minting a [`ShareToken`]. Anyone
//! holding the token can read the owner's content; whether they may also
//! edit it depends on the owner's [`SharingFlags`].

mod memory;
mod provider;
mod token;

pub use memory::{MemoryShareLinkProvider, MemoryShareLinkProviderError};
pub use provider::{ResolvedShareLink, ShareLinkError, ShareLinkProvider, SharingFlags};
pub use token::{ShareToken, ShareTokenError, SHARE_TOKEN_ALPHABET, SHARE_TOKEN_LEN};
