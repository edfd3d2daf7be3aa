//! Request handlers for the public Q&A surface.

pub mod ask;
