mod patterns;
mod store;

pub use patterns::SensitivePatterns;
pub use store::{PolicyStore, RepoPolicy};
