use crate::cmd::{AsOfArgs, Ctx, InputArgs, MAX_HORIZON_MONTHS};
use crate::output::emit;
use advkit_core::audit::{self, AuditArea};
use advkit_core::input::load_records;
use anyhow::Context;
use clap::Args;

#[derive(Args)]
pub struct AuditArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub as_of: AsOfArgs,

    /// Planning horizon in months
    #[arg(
        long,
        default_value_t = 12,
        value_name = "MONTHS",
        value_parser = clap::value_parser!(u32).range(..=MAX_HORIZON_MONTHS)
    )]
    pub horizon_months: u32,
}

pub fn run(ctx: &Ctx, args: AuditArgs) -> anyhow::Result<()> {
    let areas: Vec<AuditArea> =
        load_records(args.input.path(), &["areas"]).context("failed to load audit areas")?;
    let report = audit::plan(areas, args.as_of.date(), args.horizon_months, &ctx.config.audit)?;
    emit(ctx, &report)
}
