//! Interactive terminal chat.

use super::process_links;
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::session::{Assistant, Session};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let spinner = Output::spinner("Loading embedding model...");
    let assistant = Assistant::new(&settings);
    spinner.finish_and_clear();
    let assistant = assistant?;

    let mut session = Session::new();

    println!("\n{}", style("Chat with YouTube videos").bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, '/links' to load other videos, '/history' to show the conversation, or 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if !session.is_ready() {
            let Some(links) = read_links(&stdin)? else {
                break;
            };
            if links.is_empty() {
                continue;
            }
            match process_links(&assistant, &mut session, &links).await {
                Ok(_) => Output::conversation(session.messages()),
                Err(e) => Output::error(&format!("Error: {}", e)),
            }
            continue;
        }

        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input == "/links" {
            let Some(links) = read_links(&stdin)? else {
                break;
            };
            if !links.is_empty() {
                match process_links(&assistant, &mut session, &links).await {
                    Ok(_) => Output::conversation(session.messages()),
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
            continue;
        }

        if input == "/history" {
            Output::conversation(session.messages());
            continue;
        }

        let spinner = Output::spinner("Generating answer...");
        let result = assistant.ask(&mut session, input).await;
        spinner.finish_and_clear();

        match result {
            Ok(Some(answer)) => {
                println!("\n{} {}\n", style("Bot:").cyan().bold(), answer);
            }
            Ok(None) => {}
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}

/// Read links, one per line, until a blank line. Returns `None` on end of input.
fn read_links(stdin: &io::Stdin) -> io::Result<Option<Vec<String>>> {
    println!(
        "{}",
        style("Paste YouTube video links, one per line, then an empty line:").bold()
    );

    let mut links = Vec::new();
    loop {
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(if links.is_empty() { None } else { Some(links) });
        }
        let line = line.trim();
        if line.is_empty() {
            return Ok(Some(links));
        }
        links.push(line.to_string());
    }
}
