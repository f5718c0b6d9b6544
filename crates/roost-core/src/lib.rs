pub mod errors;
pub mod filter;
pub mod models;
pub mod policy;
pub mod store;

pub use errors::StoreError;
pub use filter::{Filter, FilterTerm};
pub use models::{Message, MessageId};
pub use policy::{MutingPolicy, UserIdentity};
pub use store::{AddResult, MessageIndex, MessageListData};
