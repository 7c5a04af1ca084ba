mod args;
mod summarize;

pub use args::{Args, OutputFormat};
pub use summarize::run_summarize;

use crate::error::{Error, ErrorKind};

/// Process exit status for a failed run.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let Some(err) = err.downcast_ref::<Error>() else {
        return 1;
    };
    match err.kind() {
        ErrorKind::InvalidInput => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::PrivateRepository => 4,
        ErrorKind::RateLimited => 5,
        ErrorKind::Gateway => 6,
        ErrorKind::Fetch => 7,
    }
}
