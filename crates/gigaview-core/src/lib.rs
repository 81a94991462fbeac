pub mod canvas;
pub mod compose;
pub mod config;
pub mod consts;
pub mod error;
pub mod events;
pub mod fetch;
pub mod geometry;
pub mod pyramid;
pub mod session;
pub mod source;
pub mod viewport;
