//! Interactive chat command.

use crate::cli::Output;
use crate::config::{ApiKeys, Settings};
use crate::hub::Hub;
use crate::session::{SessionStore, Surface};
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat page for one surface.
pub async fn run_chat(surface: &str, settings: Settings, keys: ApiKeys) -> anyhow::Result<()> {
    let surface: Surface = surface.parse()?;
    let hub = Hub::new(&settings, &keys)?;
    let mut sessions = SessionStore::new();

    println!("\n{}", style(surface.title()).bold().cyan());
    println!("{}\n", style("Type your message, or 'exit' to quit.").dim());

    for message in sessions.get_or_create(surface.id()).history() {
        Output::message(message);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        let spinner = Output::spinner("Thinking...");
        let result = hub.chat(&mut sessions, surface, input).await;
        spinner.finish_and_clear();

        match result {
            Ok(reply) => {
                println!("\n{} {}\n", style("Assistant:").cyan().bold(), reply);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
