use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("lapmon version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
