pub mod error;
pub mod openrouter;
pub mod traits;
pub mod util;

pub use error::AiError;
pub use openrouter::OpenRouter;
pub use traits::{ChatModel, Message, MessageRole};
pub use util::strip_code_blocks;
