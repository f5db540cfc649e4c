pub mod codec;
pub mod command;
pub mod connection;
pub mod router;
pub mod server;

pub use codec::{ProtocolError, Request, Response, Status};
pub use command::Command;
pub use connection::MAX_LINE_BYTES;
pub use router::Dispatcher;
pub use server::Server;
