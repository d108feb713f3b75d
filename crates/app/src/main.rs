//! Chisel Application CLI

use std::process::ExitCode;

use chisel::{codes::PromoCodeName, promo_codes::DiscountKind};
use chisel_app::{
    context::store_currency,
    database::{self, Db},
    domain::promo_codes::{
        PgPromoCodesService, PromoCodesService,
        data::{NewPromoCode, PromoCodeDetails, PromoDiscount},
        records::{PromoCodeRecord, PromoCodeUuid},
    },
};
use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "chisel-app", about = "Chisel CLI", long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    /// ISO 4217 code of the store currency
    #[arg(long, env = "STORE_CURRENCY", default_value = "INR", global = true)]
    currency: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage promo codes
    Promo(PromoCommand),
}

#[derive(Debug, Args)]
struct PromoCommand {
    #[command(subcommand)]
    command: PromoSubcommand,
}

#[derive(Debug, Subcommand)]
enum PromoSubcommand {
    /// Create a promo code
    Create(CreatePromoArgs),

    /// List live promo codes as JSON lines
    List,

    /// Switch a promo code off
    Deactivate(DeactivatePromoArgs),
}

#[derive(Debug, Args)]
struct CreatePromoArgs {
    /// Code customers type at checkout; stored upper-cased
    #[arg(long, value_parser = PromoCodeName::parse)]
    code: PromoCodeName,

    /// `percentage` or `flat`
    #[arg(long = "type", value_parser = parse_discount_kind)]
    discount_type: DiscountKind,

    /// Percentage points, or flat amount in minor units
    #[arg(long)]
    value: u64,

    /// Cap on percentage discounts, in minor units
    #[arg(long)]
    max_discount: Option<u64>,

    /// Smallest qualifying order total, in minor units
    #[arg(long)]
    min_order_value: Option<u64>,

    /// RFC 3339 instant the code opens
    #[arg(long)]
    valid_from: Option<Timestamp>,

    /// RFC 3339 instant the code closes
    #[arg(long)]
    valid_until: Option<Timestamp>,

    /// Total redemptions allowed
    #[arg(long)]
    usage_limit: Option<u32>,

    /// Redemptions allowed per signed-in user
    #[arg(long)]
    per_user_limit: Option<u32>,

    /// Text shown to customers
    #[arg(long, default_value = "")]
    description: String,

    /// Create the code switched off
    #[arg(long)]
    inactive: bool,
}

#[derive(Debug, Args)]
struct DeactivatePromoArgs {
    /// Code to switch off
    #[arg(value_parser = PromoCodeName::parse)]
    code: PromoCodeName,
}

#[tokio::main]
pub async fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = run(cli).await;

    database::close_shared_pool().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let service = connect(&cli).await?;

    match cli.command {
        Commands::Promo(PromoCommand { command }) => match command {
            PromoSubcommand::Create(args) => create_promo(&service, args).await,
            PromoSubcommand::List => list_promos(&service).await,
            PromoSubcommand::Deactivate(args) => deactivate_promo(&service, args).await,
        },
    }
}

async fn connect(cli: &Cli) -> Result<PgPromoCodesService, String> {
    let url = cli
        .database_url
        .as_deref()
        .ok_or("--database-url or DATABASE_URL is required")?;

    let currency = store_currency(&cli.currency).map_err(|error| error.to_string())?;

    let pool = database::shared_pool(url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(PgPromoCodesService::new(Db::new(pool), currency))
}

async fn create_promo(service: &PgPromoCodesService, args: CreatePromoArgs) -> Result<(), String> {
    let discount = match args.discount_type {
        DiscountKind::Percentage => PromoDiscount::Percentage {
            percentage: u16::try_from(args.value)
                .map_err(|error| format!("percentage {}: {error}", args.value))?,
            max_discount: args.max_discount,
        },
        DiscountKind::Flat => {
            if args.max_discount.is_some() {
                return Err("--max-discount only applies to percentage codes".to_string());
            }

            PromoDiscount::Flat { amount: args.value }
        }
    };

    let details = PromoCodeDetails {
        code: args.code,
        discount,
        min_order_value: args.min_order_value,
        valid_from: args.valid_from,
        valid_until: args.valid_until,
        usage_limit: args.usage_limit,
        per_user_limit: args.per_user_limit,
        description: args.description,
        active: !args.inactive,
    };

    let record = service
        .create_promo_code(NewPromoCode {
            uuid: PromoCodeUuid::new(),
            details,
        })
        .await
        .map_err(|error| format!("failed to create promo code: {error}"))?;

    println!("{}", to_json(&record));

    Ok(())
}

async fn list_promos(service: &PgPromoCodesService) -> Result<(), String> {
    let records = service
        .list_promo_codes()
        .await
        .map_err(|error| format!("failed to list promo codes: {error}"))?;

    for record in &records {
        println!("{}", to_json(record));
    }

    Ok(())
}

async fn deactivate_promo(
    service: &PgPromoCodesService,
    args: DeactivatePromoArgs,
) -> Result<(), String> {
    let record = service
        .set_promo_code_active(args.code, false)
        .await
        .map_err(|error| format!("failed to deactivate promo code: {error}"))?;

    println!("{}", to_json(&record));

    Ok(())
}

fn parse_discount_kind(raw: &str) -> Result<DiscountKind, String> {
    raw.parse().map_err(|error: chisel::promo_codes::PromoCodeError| error.to_string())
}

fn to_json(record: &PromoCodeRecord) -> serde_json::Value {
    json!({
        "uuid": record.uuid,
        "code": record.code,
        "type": record.discount_type.as_str(),
        "value": record.discount_value,
        "max_discount": record.max_discount,
        "min_order_value": record.min_order_value,
        "valid_from": record.valid_from,
        "valid_until": record.valid_until,
        "usage_limit": record.usage_limit,
        "usage_count": record.usage_count,
        "per_user_limit": record.per_user_limit,
        "description": record.description,
        "active": record.active,
    })
}
