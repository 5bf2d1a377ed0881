pub mod host;
pub mod json_host;
pub mod lookup;
pub mod session;
pub mod types;

pub use host::*;
pub use json_host::JsonLinesHost;
pub use lookup::*;
pub use session::Session;
pub use types::*;
