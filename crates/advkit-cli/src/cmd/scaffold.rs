use crate::cmd::{Ctx, InputArgs};
use crate::output::emit;
use advkit_core::input::load_document;
use advkit_core::scaffold::{self, csharp, java, k8s, terraform, ScaffoldReport};
use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args)]
pub struct ScaffoldArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Also write the generated files below this directory
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ScaffoldSubcommand {
    /// Java class with constructors, getters/setters and toString
    Java(ScaffoldArgs),

    /// C# class with auto-properties and a constructor
    Csharp(ScaffoldArgs),

    /// Terraform module: main.tf, variables.tf, outputs.tf
    Terraform(ScaffoldArgs),

    /// Kubernetes Deployment and Service manifests
    K8s(ScaffoldArgs),
}

pub fn run(ctx: &Ctx, subcmd: ScaffoldSubcommand) -> anyhow::Result<()> {
    let (report, args) = match subcmd {
        ScaffoldSubcommand::Java(args) => {
            let spec: java::JavaSpec = load_spec(&args)?;
            (java::generate(&spec)?, args)
        }
        ScaffoldSubcommand::Csharp(args) => {
            let spec: csharp::CsharpSpec = load_spec(&args)?;
            (csharp::generate(&spec)?, args)
        }
        ScaffoldSubcommand::Terraform(args) => {
            let spec: terraform::TerraformSpec = load_spec(&args)?;
            (terraform::generate(&spec)?, args)
        }
        ScaffoldSubcommand::K8s(args) => {
            let spec: k8s::K8sSpec = load_spec(&args)?;
            (k8s::generate(&spec)?, args)
        }
    };
    if let Some(dir) = &args.out_dir {
        write(&report, dir)?;
    }
    emit(ctx, &report)
}

fn load_spec<T: serde::de::DeserializeOwned>(args: &ScaffoldArgs) -> anyhow::Result<T> {
    load_document(args.input.path()).context("failed to load scaffold spec")
}

fn write(report: &ScaffoldReport, dir: &std::path::Path) -> anyhow::Result<()> {
    let written = scaffold::write_files(report, dir)?;
    for path in &written {
        eprintln!("Created {}", path.display());
    }
    Ok(())
}
