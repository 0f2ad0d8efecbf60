mod gateway;
mod model;
mod parse;
mod prompt;

pub use gateway::{AnalysisProvider, ClassifierGateway};
pub use model::{Category, Classification, Severity};
pub use parse::{parse_classification, strip_code_fence, validate_classification};
pub use prompt::build_prompt;
