//! Per-namespace session lifecycle and permission resolution.
//!
//! One [`SessionAuthority`] instance exists per principal namespace
//! (`admin`, `member`), constructed at startup and passed by reference --
//! the two namespaces share nothing but the store, and a token issued under
//! one is never valid under the other.

mod authority;
mod session;
mod traits;

pub use authority::SessionAuthority;
pub use session::{Session, SessionConfig};
pub use traits::{CredentialVerifier, PrincipalDirectory};
