use std::error::Error;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use engine::{Engine, Money, commands::ProductCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "nodefolio_admin")]
#[command(about = "Admin utilities for Nodefolio (bootstrap admins, products, coupons)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./nodefolio.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Profile(Profile),
    Product(Product),
    Coupon(Coupon),
    /// Mark every matured investment as completed.
    Sweep(SweepArgs),
}

#[derive(Args, Debug)]
struct Profile {
    #[command(subcommand)]
    command: ProfileCommand,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Create(ProfileCreateArgs),
    /// Grant the admin role to an existing profile.
    Promote(ProfilePromoteArgs),
}

#[derive(Args, Debug)]
struct ProfileCreateArgs {
    /// Identity id issued by the auth provider.
    #[arg(long)]
    id: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    admin: bool,
}

#[derive(Args, Debug)]
struct ProfilePromoteArgs {
    #[arg(long)]
    id: String,
}

#[derive(Args, Debug)]
struct Product {
    #[command(subcommand)]
    command: ProductCommand,
}

#[derive(Subcommand, Debug)]
enum ProductCommand {
    Create(ProductCreateArgs),
}

#[derive(Args, Debug)]
struct ProductCreateArgs {
    /// Admin profile performing the action.
    #[arg(long)]
    admin: String,
    #[arg(long)]
    name: String,
    /// Price in naira, e.g. `50,000` or `1500.50`.
    #[arg(long)]
    price: Money,
    /// Percent of the price earned per day.
    #[arg(long)]
    daily_roi: f64,
    #[arg(long, default_value_t = 30)]
    duration_days: i32,
    #[arg(long)]
    image_url: Option<String>,
}

#[derive(Args, Debug)]
struct Coupon {
    #[command(subcommand)]
    command: CouponCommand,
}

#[derive(Subcommand, Debug)]
enum CouponCommand {
    Create(CouponCreateArgs),
}

#[derive(Args, Debug)]
struct CouponCreateArgs {
    #[arg(long)]
    admin: String,
    #[arg(long)]
    code: String,
    /// Amount in naira.
    #[arg(long)]
    amount: Money,
}

#[derive(Args, Debug)]
struct SweepArgs {
    #[arg(long)]
    admin: String,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;
    let now = Utc::now();

    match cli.command {
        Command::Profile(Profile {
            command: ProfileCommand::Create(args),
        }) => {
            let profile = engine
                .register_profile(&args.id, &args.email, None, now)
                .await?;
            if args.admin {
                engine.promote_to_admin(&profile.id).await?;
            }
            println!(
                "created profile: {} (referral code {})",
                profile.id, profile.referral_code
            );
        }
        Command::Profile(Profile {
            command: ProfileCommand::Promote(args),
        }) => {
            let profile = engine.promote_to_admin(&args.id).await?;
            println!("promoted to admin: {}", profile.id);
        }
        Command::Product(Product {
            command: ProductCommand::Create(args),
        }) => {
            let session = engine.open_session(&args.admin).await?;
            let mut cmd = ProductCmd::new(args.name, args.price, args.daily_roi, args.duration_days);
            if let Some(image_url) = args.image_url {
                cmd = cmd.image_url(image_url);
            }
            let product = engine.create_product(&session, cmd, now).await?;
            println!(
                "created product: {} at {} ({})",
                product.name, product.price, product.id
            );
        }
        Command::Coupon(Coupon {
            command: CouponCommand::Create(args),
        }) => {
            let session = engine.open_session(&args.admin).await?;
            let coupon = engine
                .create_coupon(&session, &args.code, args.amount, now)
                .await?;
            println!("created coupon: {} worth {}", coupon.code, coupon.amount);
        }
        Command::Sweep(args) => {
            let session = engine.open_session(&args.admin).await?;
            let completed = engine.complete_matured_investments(&session, now).await?;
            println!("completed {completed} matured investments");
        }
    }

    Ok(())
}
