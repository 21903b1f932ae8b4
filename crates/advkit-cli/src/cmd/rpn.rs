use crate::cmd::{Ctx, InputArgs};
use crate::output::emit;
use advkit_core::input::load_records;
use advkit_core::rpn::{self, FailureMode};
use anyhow::Context;
use clap::Args;

#[derive(Args)]
pub struct RpnArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn run(ctx: &Ctx, args: RpnArgs) -> anyhow::Result<()> {
    let modes: Vec<FailureMode> = load_records(args.input.path(), &["failure_modes"])
        .context("failed to load failure modes")?;
    let report = rpn::analyze(modes, &ctx.config.rpn)?;
    emit(ctx, &report)
}
