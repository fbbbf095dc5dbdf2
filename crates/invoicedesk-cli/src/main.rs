mod display;
mod prompt;

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use invoicedesk_ai::{EXAMPLE_INVOICE, InvoiceAnalyzer};
use invoicedesk_core::{
    ClientId, ClientRecord, EditController, EditError, Field, RemoteError,
};
use invoicedesk_store::{ClientDirectory, Deletion, FormError, StoreError, submit_form};
use invoicedesk_sync::ApiClient;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "invoicedesk")]
#[command(about = "Client registry and invoice classification")]
#[command(version)]
struct Cli {
    /// Base URL of the directory and classification services
    #[arg(
        long,
        global = true,
        default_value = "http://localhost:8000",
        env = "INVOICEDESK_API_URL"
    )]
    api_url: String,

    /// Per-request timeout in seconds
    #[arg(
        long,
        global = true,
        env = "INVOICEDESK_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: Option<u64>,

    /// Log requests and state changes to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage registered clients
    #[command(subcommand)]
    Clients(ClientsCommand),

    /// Classify an invoice's raw text
    Analyze(AnalyzeArgs),

    /// Check that the service is up
    Health,
}

#[derive(Subcommand, Debug)]
enum ClientsCommand {
    /// List every client
    List,
    /// Show one client
    Show { id: i64 },
    /// Register a new client
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// CPF or CNPJ, with or without punctuation
        #[arg(long)]
        tax_id: String,
    },
    /// Change an existing client; omitted fields keep their current value
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        tax_id: Option<String>,
    },
    /// Remove a client
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Invoice text; `-` or nothing reads stdin
    #[arg(conflicts_with_all = ["file", "example"])]
    text: Option<String>,

    /// Read the invoice text from a file
    #[arg(long, conflicts_with = "example")]
    file: Option<PathBuf>,

    /// Analyze a built-in sample pharmacy invoice
    #[arg(long)]
    example: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();
    tracing::info!("invoicedesk v{}", env!("CARGO_PKG_VERSION"));

    let api = match cli.timeout_secs {
        Some(secs) => ApiClient::with_timeout(&cli.api_url, Duration::from_secs(secs))
            .context("building HTTP client")?,
        None => ApiClient::new(&cli.api_url),
    };

    match cli.command {
        Command::Clients(cmd) => run_clients(cmd, api).await,
        Command::Analyze(args) => run_analyze(args, api).await,
        Command::Health => {
            let health = api
                .health()
                .await
                .with_context(|| format!("service at {} is unreachable", api.base_url()))?;
            println!("{}: {}", api.base_url(), health.status);
            Ok(())
        }
    }
}

async fn run_clients(cmd: ClientsCommand, api: ApiClient) -> anyhow::Result<()> {
    match cmd {
        ClientsCommand::List => {
            let directory = ClientDirectory::new(api);
            let clients = directory.list().await?;
            display::print_client_table(&clients);
        }
        ClientsCommand::Show { id } => {
            let record = api
                .fetch_client(ClientId(id))
                .await
                .map_err(RemoteError::from)
                .map_err(|e| match e {
                    RemoteError::NotFound { .. } => anyhow::anyhow!("client {id} not found"),
                    other => anyhow::anyhow!(other.message_or("failed to load client")),
                })?;
            display::print_client_card(&record);
        }
        ClientsCommand::Add {
            name,
            email,
            tax_id,
        } => {
            let directory = ClientDirectory::new(api);
            let mut form = EditController::new();
            form.set_field(Field::Name, name);
            form.set_field(Field::Email, email);
            form.set_field(Field::TaxId, tax_id);
            let created = submit(&mut form, &directory).await?;
            println!("Created client {}", created.id);
            display::print_client_card(&created);
        }
        ClientsCommand::Edit {
            id,
            name,
            email,
            tax_id,
        } => {
            let directory = ClientDirectory::new(api);
            directory.list().await?;
            let Some(record) = directory.find(ClientId(id)) else {
                bail!("client {id} not found");
            };

            let mut form = EditController::new();
            form.begin_edit(record)?;
            let changes = [(Field::Name, name), (Field::Email, email), (Field::TaxId, tax_id)];
            for (field, value) in changes {
                if let Some(value) = value {
                    form.set_field(field, value);
                }
            }
            let updated = submit(&mut form, &directory).await?;
            println!("Updated client {}", updated.id);
            display::print_client_card(&updated);
        }
        ClientsCommand::Delete { id, yes } => {
            let directory = ClientDirectory::new(api);
            let id = ClientId(id);
            let outcome = if yes {
                directory.delete(id, &|_: &str| true).await?
            } else {
                directory.delete(id, &prompt::StdinConfirm).await?
            };
            match outcome {
                Deletion::Deleted => println!("Deleted client {id}"),
                Deletion::Declined => println!("Kept client {id}"),
            }
        }
    }
    Ok(())
}

/// Submit the form, printing per-field messages when the draft is invalid.
async fn submit(
    form: &mut EditController,
    directory: &ClientDirectory<ApiClient>,
) -> anyhow::Result<ClientRecord> {
    match submit_form(form, directory).await {
        Ok(record) => Ok(record),
        Err(FormError::Edit(EditError::Invalid(errors)))
        | Err(FormError::Store(StoreError::Validation(errors))) => {
            display::print_field_errors(&errors);
            bail!("client not saved");
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_analyze(args: AnalyzeArgs, api: ApiClient) -> anyhow::Result<()> {
    let text = invoice_text(&args)?;
    let analyzer = InvoiceAnalyzer::new(api);
    let report = analyzer.analyze_report(&text).await?;
    display::print_analysis(&report);
    Ok(())
}

fn invoice_text(args: &AnalyzeArgs) -> anyhow::Result<String> {
    if args.example {
        return Ok(EXAMPLE_INVOICE.to_string());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }
    match args.text.as_deref() {
        Some("-") | None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading invoice text from stdin")?;
            Ok(text)
        }
        Some(text) => Ok(text.to_string()),
    }
}
