pub mod llm;
pub mod schema;
