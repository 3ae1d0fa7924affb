pub mod circuit;
pub mod circuit_type;
pub mod provider;
pub mod reference;
pub mod termination;

pub use circuit::*;
pub use circuit_type::*;
pub use provider::*;
pub use reference::*;
pub use termination::*;
