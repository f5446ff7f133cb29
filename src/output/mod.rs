mod report;
mod summary;

pub use report::build_review_markdown;
pub use summary::{build_report, write_review, ReviewReport};
