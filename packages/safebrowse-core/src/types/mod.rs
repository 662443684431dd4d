//! Domain types shared by the workflows and capabilities.

pub mod document;
pub mod request;
pub mod settings;
pub mod website;
