use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use procurement_desk::api::ProcurementApi;
use procurement_desk::api::http::HttpApi;
use procurement_desk::config::policy::mime_for_file_name;
use procurement_desk::config::session::Session;
use procurement_desk::config::settings::{Settings, load_default_settings, load_settings};
use procurement_desk::core::amount::format_currency;
use procurement_desk::core::form::{EntityForm, Flow};
use procurement_desk::core::notify::TracingSink;
use procurement_desk::core::orchestrator::SubmissionOrchestrator;
use procurement_desk::core::staging::StagedAttachment;
use procurement_desk::core::validation::ValidationContext;
use procurement_desk::entities::{
    AttachmentMeta, EntityId, EntityKind, FieldKind, PendingFile, PersistedEntity, Selection,
};
use procurement_desk::errors::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Procurement desk: create, edit and inspect purchase orders, budget lines,
/// milestones, tasks and allocations.
#[derive(Parser)]
#[command(name = "procurement-desk", version, about = "Procurement records and their documents")]
struct Cli {
    /// Path to a config.toml (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a form from a draft file, stage documents and submit it
    Submit {
        /// Flow to open, e.g. add-purchase-order or edit-milestone
        #[arg(long)]
        flow: Flow,
        /// TOML draft with a [fields] table (and an optional [known] table)
        #[arg(long)]
        draft: Option<PathBuf>,
        /// Record to edit (edit flows)
        #[arg(long)]
        id: Option<EntityId>,
        /// Owning purchase order or budget line (milestones, allocations)
        #[arg(long)]
        parent: Option<EntityId>,
        /// File to attach; repeatable
        #[arg(long = "attach")]
        attach: Vec<PathBuf>,
        /// Name of an existing document to remove; repeatable
        #[arg(long = "detach")]
        detach: Vec<String>,
    },

    /// Show one record and its documents
    View {
        /// Record kind, e.g. purchase-order
        #[arg(long)]
        kind: EntityKind,
        /// Record id
        #[arg(long)]
        id: EntityId,
    },

    /// List every record of a kind
    List {
        /// Record kind
        #[arg(long)]
        kind: EntityKind,
    },

    /// Delete one record
    Delete {
        /// Record kind
        #[arg(long)]
        kind: EntityKind,
        /// Record id
        #[arg(long)]
        id: EntityId,
    },
}

/// Contents of a `--draft` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DraftFile {
    /// Typed input per field; integers on dropdown fields select a known option
    fields: BTreeMap<String, toml::Value>,
    /// Known dropdown options by id
    known: BTreeMap<String, toml::Value>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file
    dotenv().ok(); // Non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    let cli = Cli::parse();

    // 3. Settings and session
    let mut settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => load_default_settings()?,
    };
    settings.api.base_url = settings.api.base_url.trim_end_matches('/').to_string();
    let session = Arc::new(
        Session::from_env().inspect_err(|e| error!("Cannot start a session: {}", e))?,
    );
    let api = Arc::new(HttpApi::new(
        settings.api.base_url.clone(),
        Arc::clone(&session),
    ));
    info!("Using backend at {}", settings.api.base_url);

    // 4. Run the command
    let result = match cli.command {
        Commands::Submit {
            flow,
            draft,
            id,
            parent,
            attach,
            detach,
        } => {
            let request = SubmitRequest {
                flow,
                draft,
                id,
                parent,
                attach,
                detach,
            };
            run_submit(api, &settings, request).await
        }
        Commands::View { kind, id } => run_view(api.as_ref(), &settings, kind, &id).await,
        Commands::List { kind } => run_list(api.as_ref(), kind).await,
        Commands::Delete { kind, id } => {
            api.delete(kind, &id).await?;
            println!("Deleted {kind} {id}");
            Ok(())
        }
    };

    session.logout();
    result
}

struct SubmitRequest {
    flow: Flow,
    draft: Option<PathBuf>,
    id: Option<EntityId>,
    parent: Option<EntityId>,
    attach: Vec<PathBuf>,
    detach: Vec<String>,
}

async fn run_submit(api: Arc<HttpApi>, settings: &Settings, request: SubmitRequest) -> Result<()> {
    let policy = &settings.attachments;
    let sink = Arc::new(TracingSink);
    let mut form = match &request.id {
        Some(id) => EntityForm::open_existing(api.as_ref(), request.flow, id, policy).await?,
        None => EntityForm::open_create(request.flow, policy)?,
    };
    if let Some(parent) = request.parent {
        form = form.with_parent(parent);
    }

    if let Some(path) = &request.draft {
        let contents = tokio::fs::read_to_string(path).await?;
        let draft: DraftFile = toml::from_str(&contents)?;
        apply_draft(&mut form, &draft)?;
    }

    for name in &request.detach {
        let index = form
            .staging()
            .and_then(|staging| {
                staging
                    .items()
                    .iter()
                    .position(|item| {
                        matches!(item, StagedAttachment::Existing(_)) && item.name() == name.as_str()
                    })
            })
            .ok_or_else(|| Error::Config {
                message: format!("No existing document named '{name}'"),
            })?;
        form.remove_attachment(api.as_ref(), sink.as_ref(), index).await?;
    }

    if !request.attach.is_empty() {
        let files = read_files(&request.attach).await?;
        form.add_attachments(files, sink.as_ref())?;
    }

    let ctx = form
        .load_context(
            api.as_ref(),
            ValidationContext::for_today().with_currency(settings.display.currency.clone()),
        )
        .await?;

    let orchestrator = SubmissionOrchestrator::new(api, sink);
    let outcome = orchestrator
        .submit(&mut form, &ctx, |parent| {
            info!("Saved {} {}", parent.kind, parent.id);
        })
        .await
        .inspect_err(|e| {
            if let Error::Validation { errors } = e {
                for (field, message) in errors {
                    eprintln!("  {field}: {message}");
                }
            }
        })?;

    println!("Saved {} {}", outcome.parent.kind, outcome.parent.id);
    for meta in &outcome.uploaded {
        println!("  uploaded {} ({})", meta.name, meta.id);
    }
    for id in &outcome.deleted {
        println!("  deleted document {id}");
    }
    for warning in &outcome.warnings {
        println!("  warning: {warning}");
    }
    Ok(())
}

fn apply_draft(form: &mut EntityForm, draft: &DraftFile) -> Result<()> {
    let kind = form.spec().kind;
    for (field, value) in &draft.fields {
        let is_choice = kind
            .field(field)
            .is_some_and(|spec| matches!(spec.kind, FieldKind::Choice { .. }));
        match value {
            toml::Value::String(text) => form.set_text(field, text)?,
            toml::Value::Integer(n) if is_choice => {
                form.set_choice(field, Selection::Known(EntityId::Int(*n)))?;
            }
            toml::Value::Integer(n) => form.set_text(field, &n.to_string())?,
            toml::Value::Float(x) => form.set_text(field, &x.to_string())?,
            toml::Value::Datetime(date) => form.set_text(field, &date.to_string())?,
            other => {
                return Err(Error::Config {
                    message: format!("Unsupported value for {field}: {other}"),
                });
            }
        }
    }
    for (field, value) in &draft.known {
        let id = match value {
            toml::Value::Integer(n) => EntityId::Int(*n),
            toml::Value::String(text) => text
                .parse::<EntityId>()
                .map_err(|message| Error::Config { message })?,
            other => {
                return Err(Error::Config {
                    message: format!("Unsupported option id for {field}: {other}"),
                });
            }
        };
        form.set_choice(field, Selection::Known(id))?;
    }
    Ok(())
}

async fn read_files(paths: &[PathBuf]) -> Result<Vec<PendingFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path).await?;
        let name = file_name(path);
        let mime = mime_for_file_name(&name).unwrap_or_default();
        files.push(PendingFile::new(name, mime, bytes));
    }
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

async fn run_view(
    api: &dyn ProcurementApi,
    settings: &Settings,
    kind: EntityKind,
    id: &EntityId,
) -> Result<()> {
    let (record, documents) = if kind == EntityKind::PurchaseOrder {
        let form = EntityForm::open_existing(api, Flow::ViewPurchaseOrder, id, &settings.attachments)
            .await?;
        let documents = form
            .staging()
            .map(|staging| staging.original().to_vec())
            .unwrap_or_default();
        let record = form.record().cloned().ok_or_else(|| Error::InvalidResponse {
            message: format!("{kind} {id} was not loaded"),
        })?;
        (record, documents)
    } else {
        let record = api.fetch(kind, id).await?;
        let documents = api.list_attachments(kind, &record.id).await?;
        (record, documents)
    };

    print_record(&record, &settings.display.currency);
    print_documents(&documents);
    Ok(())
}

fn print_record(record: &PersistedEntity, default_currency: &str) {
    let currency = record
        .text("currency")
        .filter(|code| !code.trim().is_empty())
        .unwrap_or(default_currency);
    println!("{} {}", record.kind, record.id);
    for spec in record.kind.fields() {
        let rendered = match spec.kind {
            FieldKind::Amount | FieldKind::DerivedAmount => record
                .amount(spec.name)
                .map(|amount| format_currency(amount, currency)),
            _ => record.body.get(spec.name).and_then(|value| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(text) => Some(text.clone()),
                other => Some(other.to_string()),
            }),
        };
        if let Some(rendered) = rendered {
            println!("  {:<24} {}", spec.label, rendered);
        }
    }
}

fn print_documents(documents: &[AttachmentMeta]) {
    if documents.is_empty() {
        println!("  no documents");
        return;
    }
    println!("  documents:");
    for meta in documents {
        println!("    {} ({} bytes, id {})", meta.name, meta.size, meta.id);
    }
}

async fn run_list(api: &dyn ProcurementApi, kind: EntityKind) -> Result<()> {
    let records = api.list(kind).await?;
    let title_field = kind.fields().first().map(|spec| spec.name);
    for record in &records {
        let title = title_field.and_then(|name| record.text(name)).unwrap_or("");
        println!("{:>8}  {}", record.id.to_string(), title);
    }
    println!("{} {}(s)", records.len(), kind);
    Ok(())
}
