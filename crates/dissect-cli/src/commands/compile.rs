//! Compile command - turn an expression into a regex.

use clap::Args;
use console::style;

use dissect_core::models::pattern::ExpressionKind;
use dissect_core::CompiledExpression;

/// Arguments for the compile command.
#[derive(Args)]
pub struct CompileArgs {
    /// Expression to compile (e.g. "Total: <amount:number>")
    #[arg(required = true)]
    expression: String,

    /// Treat the expression as a raw regex and only validate it
    #[arg(long)]
    regex: bool,

    /// Also list the named groups
    #[arg(long)]
    groups: bool,
}

pub async fn run(args: CompileArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    let expr = if args.regex {
        ExpressionKind::Regex(args.expression)
    } else {
        ExpressionKind::Simple(args.expression)
    };

    let compiled = CompiledExpression::compile(&expr, &config.expression)?;

    println!("{}", compiled.as_str());

    if args.groups {
        for name in compiled.group_names() {
            println!("  {} {}", style("•").cyan(), name);
        }
    }

    Ok(())
}
