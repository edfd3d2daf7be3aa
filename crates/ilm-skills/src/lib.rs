//! Answer generators plugged into the resolver's final tier.

pub use ilm_core::{AnswerGenerator, LlmMode};

mod model_router;

pub use model_router::{GenerationError, ModelRouter, APOLOGY_ANSWER};
