pub mod backend;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod provider;
pub mod session;

pub use backend::{backend_for, Backend};
pub use dispatcher::{CredentialRequest, Dispatch, Dispatcher, Reply, ReplyStatus};
pub use error::{ErrorKind, SearchError};
pub use provider::{Provider, UnknownProvider};
pub use session::{SearchSession, Ticket};
