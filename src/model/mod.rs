//! Core data model types: the MIME part tree, message metadata, addresses and attachments.

pub mod address;
pub mod attachment;
pub mod message;
pub mod part;
