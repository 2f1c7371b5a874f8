//! Request extractors.

pub mod actor;

pub use actor::{ActorExtractor, PERSONA_HEADER, SESSION_ID_HEADER, USER_ID_HEADER};
