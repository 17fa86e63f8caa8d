pub mod api;
pub mod bookmarks;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod identity;

pub use error::unpack_error;
