//! Order Engine command-line entry point.

use clap::{Parser, Subcommand};
use order_engine::config::EngineConfig;
use order_engine::models::{CreateTemplate, MessageTemplate, Order, TemplateCatalog, TemplateType};
use order_engine::services::{
    BillingCalculator, MeasurementCodec, OrderLifecycle, PaymentDecision, TemplateRenderer,
};
use rust_decimal::Decimal;
use service_core::error::AppError;
use service_core::observability::init_tracing;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "order-engine", version, about = "Tailoring order billing, lifecycle and messaging")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the billing summary of an order record.
    Summary { order: PathBuf },
    /// Decode a measurement sheet into sections.
    Measurements { file: PathBuf },
    /// Print a blank measurement sheet for a standard outfit.
    Outfit { name: String },
    /// Render a template file.
    Render {
        template: PathBuf,
        /// Context value as key=value; repeatable.
        #[arg(long = "var", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,
    },
    /// Move an order to a new status and print the outcome.
    Transition {
        order: PathBuf,
        status: String,
        /// Payment received at delivery.
        #[arg(long, conflicts_with = "skip_payment")]
        received: Option<Decimal>,
        /// Deliver without collecting the outstanding balance.
        #[arg(long)]
        skip_payment: bool,
        /// JSON array of templates.
        #[arg(long)]
        templates: Option<PathBuf>,
        #[arg(long)]
        client_name: Option<String>,
    },
    /// Render a message of the given template type for an order.
    Notify {
        order: PathBuf,
        /// Template type, e.g. payment_reminder.
        template_type: String,
        /// JSON array of templates.
        #[arg(long)]
        templates: Option<PathBuf>,
        #[arg(long)]
        client_name: Option<String>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("invalid KEY=value: no '=' found in '{}'", s))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_templates(path: Option<&Path>) -> Result<TemplateCatalog, AppError> {
    let Some(path) = path else {
        return Ok(TemplateCatalog::default());
    };
    let inputs: Vec<CreateTemplate> = read_json(path)?;
    let mut catalog = TemplateCatalog::default();
    for input in inputs {
        catalog.insert(MessageTemplate::new(input)?);
    }
    tracing::debug!(
        path = %path.display(),
        templates = catalog.templates().len(),
        "Templates loaded"
    );
    Ok(catalog)
}

fn message_context(config: &EngineConfig, client_name: Option<String>) -> HashMap<String, String> {
    let mut extra = config.shop_context();
    if let Some(name) = client_name {
        extra.insert("clientName".to_string(), name);
    }
    extra
}

fn run(command: Command, config: &EngineConfig) -> Result<(), AppError> {
    match command {
        Command::Summary { order } => {
            let order: Order = read_json(&order)?;
            print_json(&BillingCalculator::summarize(&order)?)
        }
        Command::Measurements { file } => {
            let text = std::fs::read_to_string(&file)?;
            let fields = MeasurementCodec::decode(&text);
            print_json(&MeasurementCodec::sections(&fields))
        }
        Command::Outfit { name } => {
            let catalog = config.measurement_catalog()?;
            let fields = MeasurementCodec::expand_named_outfit(&catalog, &name)?;
            println!("{}", MeasurementCodec::encode(&fields));
            Ok(())
        }
        Command::Render { template, vars } => {
            let content = std::fs::read_to_string(&template)?;
            let mut context = config.shop_context();
            context.extend(vars);
            for name in TemplateRenderer::unresolved(&content, &context) {
                tracing::warn!(variable = %name, "Template variable left unresolved");
            }
            println!("{}", TemplateRenderer::render(&content, &context));
            Ok(())
        }
        Command::Transition {
            order,
            status,
            received,
            skip_payment,
            templates,
            client_name,
        } => {
            let order: Order = read_json(&order)?;
            let templates = load_templates(templates.as_deref())?;
            let decision = match (received, skip_payment) {
                (Some(amount), _) => Some(PaymentDecision::RecordPayment(amount)),
                (None, true) => Some(PaymentDecision::SkipPayment),
                (None, false) => None,
            };
            let extra = message_context(config, client_name);

            let lifecycle = OrderLifecycle::new(&templates, &config.shop.currency_symbol);
            let outcome = lifecycle.transition_named(&order, &status, decision, &extra)?;
            print_json(&outcome)
        }
        Command::Notify {
            order,
            template_type,
            templates,
            client_name,
        } => {
            let order: Order = read_json(&order)?;
            let templates = load_templates(templates.as_deref())?;
            let template_type = TemplateType::from_string(&template_type);
            let extra = message_context(config, client_name);

            let lifecycle = OrderLifecycle::new(&templates, &config.shop.currency_symbol);
            let notification = lifecycle.notification(&order, template_type, &extra)?;
            print_json(&notification)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    init_tracing(&config.service_name, &config.log_level);

    tracing::debug!(
        version = %config.service_version,
        shop = %config.shop.name,
        catalog = ?config.measurement_catalog_path,
        "Configuration loaded"
    );

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
