use std::{error::Error, str::FromStr};

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{
    BalanceMode, CreateExpenseCmd, CreateUserCmd, Engine, Money, ParticipantSpec, SplitType,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "splitledger_admin")]
#[command(about = "Admin utilities for the split ledger (users, expenses, balances)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./splitledger.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Expense(Expense),
    /// Print the passbook, raw or simplified.
    Balances(BalancesArgs),
    /// Print the passbook rows one user takes part in.
    Passbook(PassbookArgs),
    /// Compute the weekly summaries, and optionally mail them.
    WeeklySummary(WeeklySummaryArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// Generated from the name when omitted.
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    mobile: Option<String>,
}

#[derive(Args, Debug)]
struct Expense {
    #[command(subcommand)]
    command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    Add(ExpenseAddArgs),
}

#[derive(Args, Debug)]
struct ExpenseAddArgs {
    #[arg(long)]
    payer: String,
    #[arg(long)]
    amount: String,
    /// `equal`, `exact` or `percent`.
    #[arg(long = "type", default_value = "equal")]
    split_type: String,
    /// `user` for equal splits, `user=value` for exact and percent splits.
    #[arg(long = "participant", required = true)]
    participants: Vec<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    note: Option<String>,
}

#[derive(Args, Debug)]
struct BalancesArgs {
    #[arg(long)]
    simplify: bool,
}

#[derive(Args, Debug)]
struct PassbookArgs {
    user: String,
}

#[derive(Args, Debug)]
struct WeeklySummaryArgs {
    /// Last day of the window (defaults to today, UTC).
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Mail the summaries through the log transport instead of printing them.
    #[arg(long)]
    send: bool,
}

fn participant_spec(split_type: SplitType, raw: &str) -> ParticipantSpec {
    let (user, value) = match raw.split_once('=') {
        Some((user, value)) => (user.trim(), Some(value.trim())),
        None => (raw.trim(), None),
    };
    let spec = ParticipantSpec::new(user);
    match (split_type, value) {
        (SplitType::Percent, Some(value)) => spec.percentage(value),
        (_, Some(value)) => spec.amount(value),
        (_, None) => spec,
    }
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

    tracing_subscriber::fmt()
        .with_env_filter("mailer=info,engine=warn")
        .with_writer(std::io::stderr)
        .init();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let engine = Engine::builder().database(db).build().await?;
            let mut cmd = CreateUserCmd::new(args.name, args.email);
            if let Some(id) = args.id {
                cmd = cmd.user_id(id);
            }
            if let Some(mobile) = args.mobile {
                cmd = cmd.mobile_number(mobile);
            }
            let user = engine.create_user(cmd).await?;
            println!("created user: {} ({})", user.name, user.user_id);
        }
        Command::User(User {
            command: UserCommand::List,
        }) => {
            let engine = Engine::builder().database(db).build().await?;
            for user in engine.list_users().await? {
                println!("{}\t{}\t{}", user.user_id, user.name, user.email);
            }
        }
        Command::Expense(Expense {
            command: ExpenseCommand::Add(args),
        }) => {
            let engine = Engine::builder().database(db).build().await?;
            let split_type = SplitType::try_from(args.split_type.as_str())?;
            let amount = Money::from_str(&args.amount)?;
            let mut cmd = CreateExpenseCmd::new(args.payer, amount, split_type).participants(
                args.participants
                    .iter()
                    .map(|raw| participant_spec(split_type, raw)),
            );
            if let Some(name) = args.name {
                cmd = cmd.name(name);
            }
            if let Some(note) = args.note {
                cmd = cmd.note(note);
            }
            let expense = engine.create_expense(cmd).await?;
            println!("created expense: {} ({})", expense.id, expense.amount);
        }
        Command::Balances(args) => {
            let engine = Engine::builder().database(db).build().await?;
            let balances = engine
                .balances(BalanceMode::from_flag(args.simplify))
                .await?;
            println!("{}", serde_json::to_string_pretty(&balances)?);
        }
        Command::Passbook(args) => {
            let engine = Engine::builder().database(db).build().await?;
            let entries = engine.balances_for_user(&args.user).await?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::WeeklySummary(args) => {
            let today = args.date.unwrap_or_else(|| Utc::now().date_naive());
            if args.send {
                let (notifier, worker) = mailer::Mailer::builder().spawn_notifier();
                let engine = Engine::builder()
                    .database(db)
                    .notifier(notifier)
                    .build()
                    .await?;
                let sent = engine.send_weekly_summaries(today).await?;
                // The worker exits once the last notifier handle is gone.
                drop(engine);
                worker.await?;
                println!("sent {sent} weekly summaries");
            } else {
                let engine = Engine::builder().database(db).build().await?;
                let summaries = engine.weekly_summaries(today).await?;
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            }
        }
    }

    Ok(())
}
