//! Ask command implementation.

use super::process_links;
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::TubechatError;
use crate::session::{Assistant, Session};
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, links: &[String], settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let assistant = Assistant::new(&settings)?;
    let mut session = Session::new();

    let report = process_links(&assistant, &mut session, links).await?;
    if report.chunks_indexed == 0 {
        return Err(TubechatError::NotReady.into());
    }

    let spinner = Output::spinner("Generating answer...");
    let result = assistant.ask(&mut session, question).await;
    spinner.finish_and_clear();

    match result {
        Ok(Some(answer)) => println!("\n{}\n", answer),
        Ok(None) => Output::warning("Empty question, nothing to answer."),
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
