//! The conversion pipeline.
//!
//! [`walk`] finds the messages, [`dir`] converts one directory at a time,
//! [`message`] handles a single message, [`select`] picks its bodies,
//! [`attachment`] writes its attachments and [`rewrite`] patches the HTML
//! body so inline images resolve to the extracted files.

pub mod attachment;
pub mod dir;
pub mod message;
pub mod rewrite;
pub mod select;
pub mod walk;

pub use walk::{convert_plan, plan, ConversionReport, Plan};
