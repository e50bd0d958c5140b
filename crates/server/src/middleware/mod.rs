pub mod caller;

pub use caller::{Caller, USER_ID_HEADER, require_role};
