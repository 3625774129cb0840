// Authentication: passwords, generated credentials, HTTP Basic

pub mod credentials;
pub mod middleware;
pub mod password;
pub mod service;

pub use credentials::*;
pub use middleware::*;
pub use password::*;
pub use service::*;
