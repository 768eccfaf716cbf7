//! The pure protocol layer. Nothing in here touches I/O.

pub mod checksum;
pub mod command;
pub mod frame;
