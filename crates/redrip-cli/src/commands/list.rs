use clap::Args;
use redrip_client::QuerySource;
use redrip_core::models::query::Query;

use super::{remote_error, to_json, Context, OutputFormat};

#[derive(Args)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,
}

pub fn run(args: ListArgs, ctx: &Context) -> anyhow::Result<()> {
    tracing::info!("starting list command");
    let (profile, client) = ctx.client()?;
    tracing::debug!(profile = %profile.name, "fetching queries from Redash");

    println!("{}", list_output(&client, args.output)?);
    Ok(())
}

pub fn list_output(source: &dyn QuerySource, format: OutputFormat) -> anyhow::Result<String> {
    let queries = source.list_queries().map_err(remote_error)?;
    tracing::info!(count = queries.len(), "retrieved queries from Redash");
    render(&queries, format)
}

fn render(queries: &[Query], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => to_json(&queries),
        OutputFormat::Text => Ok(queries
            .iter()
            .map(|q| format!("ID: {}\tName: {}", q.id, q.name))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
