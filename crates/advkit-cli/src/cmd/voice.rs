use crate::cmd::{Ctx, InputArgs};
use crate::output::emit;
use advkit_core::input::load_text;
use advkit_core::voice::{self, parse_target};
use anyhow::Context;
use clap::Args;

#[derive(Args)]
pub struct VoiceArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Expected pole for a dimension, e.g. `formality=casual` (repeatable)
    #[arg(long = "target", value_name = "DIMENSION=POLE", value_parser = parse_target)]
    pub targets: Vec<(String, String)>,
}

pub fn run(ctx: &Ctx, args: VoiceArgs) -> anyhow::Result<()> {
    let text = load_text(args.input.path()).context("failed to read text")?;
    let report = voice::analyze(&text, &args.targets)?;
    emit(ctx, &report)
}
