use crate::cmd::{AsOfArgs, Ctx, InputArgs};
use crate::output::emit;
use advkit_core::capa::{self, CapaRecord};
use advkit_core::input::load_records;
use anyhow::Context;
use clap::Args;

#[derive(Args)]
pub struct CapaArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub as_of: AsOfArgs,
}

pub fn run(ctx: &Ctx, args: CapaArgs) -> anyhow::Result<()> {
    let records: Vec<CapaRecord> =
        load_records(args.input.path(), &["capas"]).context("failed to load CAPA records")?;
    let report = capa::track(records, args.as_of.date(), &ctx.config.capa)?;
    emit(ctx, &report)
}
