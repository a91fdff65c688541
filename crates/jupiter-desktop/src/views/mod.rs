//! # Views
//!
//! Page-level view components for the Jupiter desktop shell.
//!
//! - [`ServerPicker`] - choose and validate the backend server

mod server_picker;

pub use server_picker::{ServerPicker, SharedShell};
