use std::time::Duration;

use finflow_client::{Client, TransactionBrowser, TransactionFilterType};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{cli::BrowseArgs, config::AppConfig, error::Result, output};

const GC_EVERY: Duration = Duration::from_secs(60);

/// One line typed at the browse prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Quit,
    Next,
    Previous,
    Kind(TransactionFilterType),
    Help,
    Search(String),
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Input::Search(line.to_string());
    };
    let (name, rest) = command
        .split_once(char::is_whitespace)
        .unwrap_or((command, ""));
    match name {
        "q" | "quit" => Input::Quit,
        "n" | "next" => Input::Next,
        "p" | "prev" => Input::Previous,
        "h" | "help" => Input::Help,
        "t" | "type" => match rest.parse() {
            Ok(kind) => Input::Kind(kind),
            Err(err) => Input::Invalid(format!("{err}")),
        },
        other => Input::Invalid(format!("unknown command :{other}")),
    }
}

fn print_help() {
    println!("Type to search. Commands: :n next page, :p previous page, :t <all|income|expense>, :q quit.");
}

async fn show(browser: &mut TransactionBrowser) {
    match browser.load().await {
        Ok(page) => {
            let filter = browser.filter();
            println!(
                "{} | type: {} | search: {}",
                output::page_header(&page),
                filter.kind(),
                filter.search().unwrap_or("-")
            );
            output::print_transactions(&page.items);
        }
        Err(err) => eprintln!("error: {err}"),
    }
}

/// Interactive loop: text lines are debounced search input, `:` lines are
/// commands.
pub async fn run(client: Client, settings: &AppConfig, args: BrowseArgs) -> Result<()> {
    let collector = client.cache().spawn_collector(GC_EVERY);
    let page_size = args.page_size.unwrap_or(settings.page_size);
    let mut browser = TransactionBrowser::new(client, page_size, settings.debounce());
    browser.set_kind(args.kind);

    print_help();
    show(&mut browser).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_input(&line) {
                    Input::Quit => break,
                    Input::Next => {
                        if browser.next_page() {
                            show(&mut browser).await;
                        } else {
                            println!("Already on the last page.");
                        }
                    }
                    Input::Previous => {
                        if browser.previous_page() {
                            show(&mut browser).await;
                        } else {
                            println!("Already on the first page.");
                        }
                    }
                    Input::Kind(kind) => {
                        browser.set_kind(kind);
                        show(&mut browser).await;
                    }
                    Input::Help => print_help(),
                    Input::Search(text) => browser.type_search(&text),
                    Input::Invalid(message) => eprintln!("{message}"),
                }
            }
            settled = browser.search_settled() => {
                if settled.is_none() {
                    break;
                }
                show(&mut browser).await;
            }
        }
    }

    collector.abort();
    Ok(())
}
