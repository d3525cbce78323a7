pub mod hashing;
#[cfg(feature = "local-model")]
pub mod local;
pub mod openai;
pub mod selection;
