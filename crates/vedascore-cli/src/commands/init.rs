//! The `vedascore init` command.

use anyhow::Result;

use vedascore_client::config::SAMPLE_CONFIG;

pub fn execute() -> Result<()> {
    let path = std::path::Path::new("vedascore.toml");
    if path.exists() {
        println!("vedascore.toml already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG)?;
        println!("Created vedascore.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit vedascore.toml with your server URL");
    println!("  2. Export VEDASCORE_SESSION with the session cookie from your browser");
    println!("  3. Run: vedascore student");

    Ok(())
}
