//! Part parsers
//!
//! This module contains the streaming XML readers for the comments part and
//! the primary content part.

pub(crate) mod comments;
pub(crate) mod walker;
pub(crate) mod xml;
