pub mod config;
pub mod datapack;
pub mod error;
pub mod server_name;

pub use error::AppError;
pub use server_name::ServerName;
