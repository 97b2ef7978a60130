/// Builtin generation model providers
pub mod completions;
/// Builtin embedding model providers
pub mod embeddings;
