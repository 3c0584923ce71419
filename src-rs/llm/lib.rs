pub mod openai_adapter;
pub mod types;

pub use openai_adapter::OpenAiAdapter;
pub use types::{
    CompletionRequest, LLMResponse, Message, ProviderAdapter, ProviderError, SharedAiClient, ToolCall, ToolSchema,
};
