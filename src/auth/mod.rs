// Command authenticity: keyed signatures and constant-time comparison
pub mod authenticator;
pub mod digest;

pub use authenticator::{signing_input, HmacAuthenticator};
pub use digest::compare_digest;
