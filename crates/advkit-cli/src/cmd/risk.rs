use crate::cmd::{Ctx, InputArgs};
use crate::output::emit;
use advkit_core::input::load_records;
use advkit_core::risk::{self, Risk};
use anyhow::Context;
use clap::Args;

#[derive(Args)]
pub struct RiskArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn run(ctx: &Ctx, args: RiskArgs) -> anyhow::Result<()> {
    let risks: Vec<Risk> =
        load_records(args.input.path(), &["risks"]).context("failed to load risk register")?;
    let report = risk::assess(risks, &ctx.config.risk)?;
    emit(ctx, &report)
}
