//! Session state: the token pair, the signed-in user, and where tokens persist.

pub mod holder;
pub mod model;
pub mod store;

pub use holder::SessionHolder;
pub use model::{Role, Session, TokenPair, UserProfile};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
