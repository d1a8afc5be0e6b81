mod comments;
mod config;
mod core;
mod editor;
mod entity;
mod error;
mod host;
mod keys;
mod ops;
mod plugin;
pub mod plugins;
mod raw;
mod selection;
mod services;
mod slash;
mod toolbar;

pub use crate::comments::*;
pub use crate::config::*;
pub use crate::core::*;
pub use crate::editor::*;
pub use crate::entity::*;
pub use crate::error::*;
pub use crate::host::*;
pub use crate::keys::*;
pub use crate::ops::*;
pub use crate::plugin::*;
pub use crate::raw::*;
pub use crate::selection::*;
pub use crate::services::*;
pub use crate::slash::*;
pub use crate::toolbar::*;
