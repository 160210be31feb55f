//! Configuration inspection command

use sinmam_core::{error::Result, Settings};

/// Print the resolved settings as JSON
pub fn handle(settings: &Settings) -> Result<()> {
    let rendered = serde_json::to_string_pretty(settings)?;
    println!("{}", rendered);
    Ok(())
}
