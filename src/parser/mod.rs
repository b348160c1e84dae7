//! Message parsing: EML reading, header decoding, and MIME part-tree construction.

pub mod eml;
pub mod header;
pub mod mime;
