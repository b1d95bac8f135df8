pub mod file_type;
pub mod protocol;
pub mod session;

pub use protocol::{ClientMessage, ServerMessage};
pub use session::{run, BridgeSession};
