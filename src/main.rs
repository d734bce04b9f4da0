use anyhow::{Context, Result};
use crate::initialization::init;

mod initialization;
mod worker;

fn main() -> Result<()> {
    let (config, mgr, units, json) = init().context("failed to initialize resortcast")?;

    worker::run(&config, &mgr, units, json)
}
