//! Access to `.esx` project files.
//!
//! A project is either a packed zip archive or a directory it was unpacked
//! into. Only JSON documents are interpreted; image blobs and every other
//! entry are carried through byte for byte.

pub mod archive;
pub mod source;

pub use archive::{pack, unpack, ArchiveEntry, EsxArchive};
pub use source::ProjectSource;
