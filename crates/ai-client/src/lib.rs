pub mod error;
pub mod openai;
pub mod util;

pub use error::AiError;
pub use openai::{OpenAi, StructuredOutput};
pub use util::{strip_code_blocks, truncate_to_char_boundary};
