//! Version command

use anyhow::Result;

/// Run the version command.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn run(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    if json {
        let obj = serde_json::json!({ "version": version });
        println!("{}", crate::output::json::format_value(&obj)?);
    } else {
        println!("deno-provision {version}");
    }
    Ok(())
}
