//! Interactive kiosk session on the terminal.
//!
//! Each input line is one tap. The session runs on its own task with the
//! real inactivity timer, so walking away from the terminal resets it to the
//! welcome screen just like the kiosk.

use std::path::Path;

use kiosk::driver::{self, DriverError};
use kiosk::{Intent, KioskError, Outcome};
use kiosk_core::{CategoryId, ItemId, LineId, OrderId};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::render;

const HELP: &str = "\
Commands:
  start              leave the welcome screen
  cat <id>           open a category
  add <item>         add an item to the cart
  cart               view the cart
  back               go back one screen
  qty <line> <n>     set a line's quantity (0 removes it)
  inc <line>         add one to a line
  dec <line>         remove one from a line
  rm <line>          remove a line
  clear              empty the cart
  order              place the order
  reorder <order>    add a previous order to the cart
  orders             list recent orders
  tap                touch the screen without doing anything
  help               show this help
  quit               leave
";

/// A line of terminal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Intent(Intent),
    Orders,
    Help,
    Quit,
}

/// Errors parsing a terminal command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("Unknown command: {0} (type `help`)")]
    Unknown(String),

    #[error("`{command}` expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("Not a number: {0}")]
    InvalidNumber(String),
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Input>, ParseCommandError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let input = match command.to_ascii_lowercase().as_str() {
        "start" => Input::Intent(Intent::Start),
        "cat" | "category" => Input::Intent(Intent::SelectCategory {
            category_id: CategoryId::new(number(words.next(), "cat", "a category id")?),
        }),
        "add" => Input::Intent(Intent::AddToCart {
            item_id: ItemId::new(number(words.next(), "add", "an item id")?),
        }),
        "cart" => Input::Intent(Intent::ViewCart),
        "back" => Input::Intent(Intent::Back),
        "qty" => {
            let line_id = LineId::new(number(words.next(), "qty", "a line id and a quantity")?);
            let quantity = number(words.next(), "qty", "a line id and a quantity")?;
            Input::Intent(Intent::SetQuantity { line_id, quantity })
        }
        "inc" => Input::Intent(Intent::Increment {
            line_id: LineId::new(number(words.next(), "inc", "a line id")?),
        }),
        "dec" => Input::Intent(Intent::Decrement {
            line_id: LineId::new(number(words.next(), "dec", "a line id")?),
        }),
        "rm" | "remove" => Input::Intent(Intent::RemoveLine {
            line_id: LineId::new(number(words.next(), "rm", "a line id")?),
        }),
        "clear" => Input::Intent(Intent::ClearCart),
        "order" => Input::Intent(Intent::PlaceOrder),
        "reorder" => Input::Intent(Intent::Reorder {
            order_id: OrderId::new(number(words.next(), "reorder", "an order id")?),
        }),
        "orders" | "history" => Input::Orders,
        "tap" => Input::Intent(Intent::AnyActivity),
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => return Err(ParseCommandError::Unknown(other.to_owned())),
    };
    Ok(Some(input))
}

fn number<T: std::str::FromStr>(
    word: Option<&str>,
    command: &'static str,
    expected: &'static str,
) -> Result<T, ParseCommandError> {
    let word = word.ok_or(ParseCommandError::MissingArgument { command, expected })?;
    word.parse()
        .map_err(|_| ParseCommandError::InvalidNumber(word.to_owned()))
}

/// Run a live session until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if configuration or the catalog cannot be loaded, stdin
/// fails, or the session task dies.
pub async fn interactive(catalog_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let (config, catalog) = super::load(catalog_path)?;
    info!(
        timeout_secs = config.inactivity_timeout.as_secs(),
        "Starting interactive session"
    );

    let handle = driver::spawn(kiosk::KioskSession::new(catalog.clone(), &config));
    let mut views = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    show(&format!("{HELP}{}", render::view(&handle.current(), &catalog)));
    views.borrow_and_update();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Input::Quit)) => break,
                    Ok(Some(Input::Help)) => show(HELP),
                    Ok(Some(Input::Orders)) => {
                        show(&render::order_history(&handle.recent_orders().await?));
                    }
                    Ok(Some(Input::Intent(intent))) => match handle.dispatch(intent).await {
                        Ok(Outcome::OrderPlaced(receipt)) => {
                            info!(order_id = %receipt.order_id, "Order confirmed");
                        }
                        Ok(_) => {}
                        Err(DriverError::Rejected(e)) => show(&rejection(&e)),
                        Err(e) => return Err(e.into()),
                    },
                    Err(e) => show(&format!("! {e}\n")),
                }
            }
            changed = views.changed() => {
                if changed.is_err() {
                    warn!("Session task stopped unexpectedly");
                    break;
                }
                let view = views.borrow_and_update().clone();
                show(&render::view(&view, &catalog));
            }
        }
    }

    let session = handle.shutdown().await?;
    info!(orders = session.history().len(), "Interactive session ended");
    Ok(())
}

fn rejection(error: &KioskError) -> String {
    if error.reset_session() {
        format!("! {error}\n! Session was reset.\n")
    } else {
        format!("! {error}\n")
    }
}

fn show(text: &str) {
    #[allow(clippy::print_stdout)]
    {
        print!("{text}");
    }
}
