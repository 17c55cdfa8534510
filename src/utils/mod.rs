pub mod email;
pub mod id;
pub mod password;

pub use email::*;
pub use id::generate_id;
pub use password::*;
