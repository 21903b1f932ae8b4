use crate::cmd::{non_negative_number, Ctx, InputArgs};
use crate::output::emit;
use advkit_core::input::load_records;
use advkit_core::sprint::{self, Sprint};
use anyhow::Context;
use clap::Args;

#[derive(Args)]
pub struct SprintArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Points left to deliver; adds a sprints-needed forecast
    #[arg(long, value_name = "POINTS", value_parser = non_negative_number)]
    pub remaining: Option<f64>,
}

pub fn run(ctx: &Ctx, args: SprintArgs) -> anyhow::Result<()> {
    let sprints: Vec<Sprint> =
        load_records(args.input.path(), &["sprints"]).context("failed to load sprint history")?;
    let report = sprint::analyze(sprints, args.remaining)?;
    emit(ctx, &report)
}
