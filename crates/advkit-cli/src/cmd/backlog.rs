use crate::cmd::{Ctx, InputArgs};
use crate::output::emit;
use advkit_core::backlog::{self, BacklogItem, Method};
use advkit_core::input::load_records;
use anyhow::Context;
use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    /// Cost of delay divided by job size
    Wsjf,
    /// Weighted sum of value, criticality and risk reduction
    Weighted,
}

impl From<MethodArg> for Method {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Wsjf => Method::Wsjf,
            MethodArg::Weighted => Method::Weighted,
        }
    }
}

#[derive(Args)]
pub struct BacklogArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Scoring method
    #[arg(long, value_enum, default_value_t = MethodArg::Wsjf)]
    pub method: MethodArg,
}

pub fn run(ctx: &Ctx, args: BacklogArgs) -> anyhow::Result<()> {
    let items: Vec<BacklogItem> =
        load_records(args.input.path(), &["items"]).context("failed to load backlog")?;
    let report = backlog::prioritize(items, args.method.into(), &ctx.config.backlog)?;
    emit(ctx, &report)
}
