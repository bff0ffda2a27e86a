//! # Adapters Layer

pub mod atom_feed;

pub use atom_feed::AtomBlogProvider;
