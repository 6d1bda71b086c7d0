//! Core layer: pure state machines, no I/O.

pub mod footer;

pub use footer::{Element, FooterMessage, FooterScanner, MarkupEvent};
