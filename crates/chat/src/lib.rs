//! Conversation engine - deterministic reply composition
//!
//! The pipeline for every inbound message:
//! 1. **Segmentation** - split the text into an FAQ part and a recommendation part
//! 2. **FAQ answering** - classifier-gated canned answers, one per sub-question
//! 3. **Recommendations** - cluster-frequency product suggestions, login-gated
//! 4. **Composition** - join the produced sections, or fall back
//!
//! The engine is a pure function of session state and input text. It never
//! touches the database; surfaces persist the transcript around it.

pub mod engine;

pub use engine::{ChatEngine, FALLBACK};
