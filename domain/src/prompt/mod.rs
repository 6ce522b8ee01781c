//! Prompt construction for extraction sampling

mod template;

pub use template::PromptTemplate;
