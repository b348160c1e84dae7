//! `emlhtml`: convert RFC 822 / MIME message files into a browsable HTML tree.
//!
//! Every message becomes a directory with an `index.html`, its plain-text and
//! HTML bodies, and its attachments. Embedded messages are converted
//! recursively and every source directory gets a listing page.

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
