mod model;
mod store;

pub use model::ProfileRecord;
pub use store::{sanitize_profile_name, ProfileStore, PROFILE_FILE_NAME};
