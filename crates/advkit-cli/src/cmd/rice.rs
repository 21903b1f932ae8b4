use crate::cmd::{positive_number, Ctx, InputArgs};
use crate::output::emit;
use advkit_core::input::load_records;
use advkit_core::rice::{self, RiceItem};
use anyhow::Context;
use clap::Args;

#[derive(Args)]
pub struct RiceArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Effort budget in person-months; selects top items greedily until spent
    #[arg(long, value_name = "MONTHS", value_parser = positive_number)]
    pub capacity: Option<f64>,
}

pub fn run(ctx: &Ctx, args: RiceArgs) -> anyhow::Result<()> {
    let items: Vec<RiceItem> =
        load_records(args.input.path(), &["features"]).context("failed to load features")?;
    let report = rice::prioritize(items, args.capacity, &ctx.config.rice)?;
    emit(ctx, &report)
}
