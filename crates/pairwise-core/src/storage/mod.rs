pub mod schema;
pub mod store;

pub use store::{HistoryLoad, MalformedLine, PreferenceStore};
