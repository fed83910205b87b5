pub mod assets;
pub mod carousel;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod macros;
pub mod persist;
pub mod sys;
