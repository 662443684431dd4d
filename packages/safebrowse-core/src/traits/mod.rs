//! Capability traits the host implements.
//!
//! The workflows never score URLs, parse PDFs or call a language model
//! themselves. They drive whichever implementation is injected here.

pub mod analyzer;
pub mod browser;
pub mod summarizer;
