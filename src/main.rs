use anyhow::Result;

fn main() -> Result<()> {
    siteprep::run()?;
    Ok(())
}
