//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod serve;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use serve::{router, run_serve, AppState};

use crate::cli::Output;
use crate::error::Result;
use crate::session::{Assistant, ProcessReport, Session};

/// Process links with a spinner, then print warnings and a summary.
pub(crate) async fn process_links(
    assistant: &Assistant,
    session: &mut Session,
    links: &[String],
) -> Result<ProcessReport> {
    let spinner = Output::spinner("Processing videos...");
    let result = assistant.process_videos(session, links).await;
    spinner.finish_and_clear();

    let report = result?;
    for warning in &report.warnings {
        Output::warning(&warning.to_string());
    }

    if report.chunks_indexed == 0 {
        Output::error("No transcript could be fetched. Check the links and try again.");
    } else {
        Output::success(&format!(
            "Videos processed successfully! ({} videos, {} chunks)",
            report.videos_ok, report.chunks_indexed
        ));
    }

    Ok(report)
}
