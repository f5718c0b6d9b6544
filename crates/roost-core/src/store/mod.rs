pub mod index;
pub mod list_data;

pub use index::MessageIndex;
pub use list_data::{AddResult, MessageListData};
