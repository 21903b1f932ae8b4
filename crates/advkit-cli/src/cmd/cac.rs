use crate::cmd::{Ctx, InputArgs};
use crate::output::emit;
use advkit_core::cac::{self, Channel};
use advkit_core::input::load_records;
use anyhow::Context;
use clap::Args;

#[derive(Args)]
pub struct CacArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn run(ctx: &Ctx, args: CacArgs) -> anyhow::Result<()> {
    let channels: Vec<Channel> =
        load_records(args.input.path(), &["channels"]).context("failed to load channels")?;
    let report = cac::analyze(channels, &ctx.config.cac)?;
    emit(ctx, &report)
}
