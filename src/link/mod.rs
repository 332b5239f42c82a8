// Radio link abstraction
pub mod traits;

#[cfg(test)]
pub mod mock;

pub use traits::{LinkError, PacketLink};
