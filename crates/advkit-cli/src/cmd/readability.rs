use crate::cmd::{Ctx, InputArgs};
use crate::output::emit;
use advkit_core::input::load_text;
use advkit_core::readability;
use anyhow::Context;
use clap::Args;

#[derive(Args)]
pub struct ReadabilityArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn run(ctx: &Ctx, args: ReadabilityArgs) -> anyhow::Result<()> {
    let text = load_text(args.input.path()).context("failed to read text")?;
    let report = readability::analyze(&text, &ctx.config.readability)?;
    emit(ctx, &report)
}
