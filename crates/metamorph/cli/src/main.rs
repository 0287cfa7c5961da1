fn main() -> anyhow::Result<()> {
    metamorph_cli::run()?;
    Ok(())
}
