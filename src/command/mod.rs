// Command uplink: authentication, replay protection and execution
pub mod envelope;
pub mod handler;
pub mod replay;
pub mod types;
pub mod uplink;

pub use envelope::EnvelopeError;
pub use handler::{CommandError, CommandHandler, Outcome};
pub use replay::{ReplayError, ReplayGuard};
pub use types::{Command, ParseError};
pub use uplink::{Uplink, UplinkError};
