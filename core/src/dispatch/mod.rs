mod dispatcher;
mod traits;

pub use dispatcher::{DispatchOutcome, DispatchTimeouts, Dispatcher};
pub use traits::{Commenter, FixInvoker, Notifier};
