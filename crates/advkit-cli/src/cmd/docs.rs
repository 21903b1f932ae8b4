use crate::cmd::{AsOfArgs, Ctx, InputArgs};
use crate::output::emit;
use advkit_core::docs::{self, Document};
use advkit_core::input::load_records;
use anyhow::Context;
use clap::Args;

#[derive(Args)]
pub struct DocsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub as_of: AsOfArgs,
}

pub fn run(ctx: &Ctx, args: DocsArgs) -> anyhow::Result<()> {
    let documents: Vec<Document> = load_records(args.input.path(), &["documents"])
        .context("failed to load document register")?;
    let report = docs::review(documents, args.as_of.date(), &ctx.config.docs)?;
    emit(ctx, &report)
}
