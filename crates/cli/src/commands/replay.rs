//! Replay a recorded intent script.
//!
//! A script is a YAML list of intents:
//!
//! ```yaml
//! - intent: start
//! - intent: select_category
//!   category_id: 1
//! - intent: add_to_cart
//!   item_id: 1
//! - intent: view_cart
//! - intent: place_order
//! ```
//!
//! Rejected intents are reported and the replay continues, as a kiosk would.

use std::fmt::Write;
use std::path::Path;

use kiosk::{Intent, KioskSession};
use serde_json::json;
use tokio::time::Instant;
use tracing::info;

use crate::render;

/// Run every intent of `script` through a fresh session and print each view.
///
/// # Errors
///
/// Returns an error if configuration, the catalog or the script cannot be
/// loaded. Rejected intents are not errors.
pub async fn replay(
    script: &Path,
    json: bool,
    catalog_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, catalog) = super::load(catalog_path)?;

    info!(path = %script.display(), "Loading intent script");
    let content = tokio::fs::read_to_string(script).await?;
    let intents: Vec<Intent> = serde_yaml::from_str(&content)?;
    info!(steps = intents.len(), "Parsed script");

    let mut session = KioskSession::new(catalog, &config);
    let transcript = run_script(&mut session, intents, json);
    #[allow(clippy::print_stdout)]
    {
        print!("{}", transcript.output);
    }

    session.shutdown();
    info!(
        rejected = transcript.rejected,
        orders = session.history().len(),
        "Replay finished"
    );
    Ok(())
}

/// Output of a replayed script.
#[derive(Debug)]
struct Transcript {
    output: String,
    rejected: usize,
}

/// Dispatch each intent in order, rendering the view after every step.
fn run_script(session: &mut KioskSession, intents: Vec<Intent>, json: bool) -> Transcript {
    let mut output = String::new();
    let mut rejected = 0_usize;

    for (index, intent) in intents.into_iter().enumerate() {
        let step = index + 1;
        let result = session.dispatch(intent, Instant::now());
        if result.is_err() {
            rejected += 1;
        }
        let view = session.view();

        if json {
            let line = json!({
                "step": step,
                "intent": intent,
                "error": result.as_ref().err().map(ToString::to_string),
                "view": view,
            });
            let _ = writeln!(output, "{line}");
        } else {
            let _ = writeln!(output, "> {step}: {}", intent.name());
            if let Err(e) = &result {
                let _ = writeln!(output, "  ! {e}");
            }
            output.push_str(&render::view(&view, session.catalog()));
        }
    }

    Transcript { output, rejected }
}
