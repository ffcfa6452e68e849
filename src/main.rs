use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use invoice_lens::config::Config;
use invoice_lens::crm::HubSpotClient;
use invoice_lens::handler::{Functions, ServerlessContext};
use invoice_lens::panel::{InvoiceCard, InvoiceTable, LocalInvoker, Panel, PanelView};
use invoice_lens::{associate, backfill, report};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "invoice-lens", about = "Look up HubSpot invoices for CRM records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Invoices at the location of a property record
    Invoices {
        #[arg(long)]
        object_id: String,
        /// Print the raw function response instead of the panel
        #[arg(long)]
        json: bool,
    },
    /// The invoice linked to a conference record
    Associated {
        #[arg(long)]
        object_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Write invoices for a location as comma-separated rows
    Export {
        #[arg(long)]
        location_id: String,
        /// Comma separated list of properties; defaults to the standard report columns
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Derive location_id from the invoice number where it is missing
    BackfillLocations {
        /// Show the planned updates without sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Associate invoices with location records sharing their location_id
    AssociateLocations {
        /// Association type id of the invoice to location label in the portal
        #[arg(long)]
        association_type_id: u32,
        /// Show the planned pairs without creating them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so reports on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;
    let client = HubSpotClient::new(&config)?;

    match cli.command {
        Command::Invoices { object_id, json } => {
            show_panel::<InvoiceTable>(&client, &config, &object_id, json).await?
        }
        Command::Associated { object_id, json } => {
            show_panel::<InvoiceCard>(&client, &config, &object_id, json).await?
        }
        Command::Export {
            location_id,
            columns,
            output,
        } => {
            let columns: Vec<&str> = if columns.is_empty() {
                report::DEFAULT_COLUMNS.to_vec()
            } else {
                columns.iter().map(String::as_str).collect()
            };

            let rows = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    let mut out = BufWriter::new(file);
                    report::export_by_location(&client, &location_id, &columns, &mut out).await?
                }
                None => {
                    let mut out = io::stdout().lock();
                    report::export_by_location(&client, &location_id, &columns, &mut out).await?
                }
            };
            info!("💾 Exported {} invoice(s)", rows);
        }
        Command::BackfillLocations { dry_run } => {
            let plan = backfill::plan(&client).await?;
            if dry_run {
                for update in &plan.updates {
                    println!("{} -> {:?}", update.id, update.properties);
                }
                info!("Dry run, {} update(s) not sent", plan.updates.len());
            } else {
                let sent = backfill::apply(&client, &plan)
                    .await
                    .context("Batch update failed")?;
                info!("✅ Updated {} invoice(s)", sent);
            }
        }
        Command::AssociateLocations {
            association_type_id,
            dry_run,
        } => {
            let location_type = &config.location_object_type;
            let plan = associate::plan(&client, location_type, association_type_id).await?;
            if dry_run {
                for input in &plan.inputs {
                    println!("invoice {} -> {} {}", input.from.id, location_type, input.to.id);
                }
                info!("Dry run, {} association(s) not created", plan.inputs.len());
            } else {
                let created = associate::apply(&client, location_type, &plan)
                    .await
                    .context("Batch association failed")?;
                info!("🔗 Associated {} invoice(s)", created);
            }
        }
    }

    Ok(())
}

async fn show_panel<T: PanelView>(
    client: &HubSpotClient,
    config: &Config,
    object_id: &str,
    json: bool,
) -> Result<()> {
    let functions = Functions::new(client, config);
    let context = ServerlessContext::for_object(object_id);

    if json {
        let response = functions
            .call(T::FUNCTION, &context)
            .await
            .context("Unknown function")?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let invoker = LocalInvoker::new(functions);
    let mut panel: Panel<T> = Panel::new();
    panel.load(&invoker, &context).await;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", panel.render())?;
    Ok(())
}
