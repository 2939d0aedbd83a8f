pub mod async_op;
pub mod collection;

pub use async_op::{AsyncOp, OpState, OpToken};
pub use collection::{RemoteCollection, RemoteItem};
