use api_types::{category::CategoryType, metadata::PaymentMethod, transaction::TransactionType};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use finflow_client::TransactionFilterType;
use rust_decimal::Decimal;

#[derive(Parser, Debug)]
#[command(name = "finflow")]
#[command(about = "Command-line client for the FinFlow personal finance API")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override login email (password is never read from CLI).
    #[arg(long, global = true)]
    pub email: Option<String>,
    /// Override log level (e.g. info, debug).
    #[arg(long, global = true)]
    pub level: Option<String>,
    /// Override where the session is stored.
    #[arg(long, global = true)]
    pub session_path: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session.
    Login,
    /// Create a new user.
    Register(RegisterArgs),
    /// Forget the stored session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    Accounts(Accounts),
    Categories(Categories),
    /// Monthly summary (defaults to the current month).
    Dashboard(DashboardArgs),
    /// Available payment methods.
    Metadata,
    /// One page of transactions.
    Transactions(ListArgs),
    /// Most recent transactions.
    Recent(RecentArgs),
    /// Create a transaction.
    Add(AddArgs),
    /// Delete a transaction.
    Delete { id: String },
    /// Interactive, searchable transaction list.
    Browse(BrowseArgs),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct Accounts {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    List,
    Create(AccountArgs),
    Update {
        id: String,
        #[command(flatten)]
        account: AccountArgs,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct AccountArgs {
    #[arg(long)]
    pub name: String,
    /// Account type, e.g. checking, savings, credit.
    #[arg(long = "type")]
    pub kind: String,
}

#[derive(Args, Debug)]
pub struct Categories {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    List {
        #[arg(long = "type", value_enum)]
        kind: Option<Direction>,
    },
    Create(CategoryArgs),
    Update {
        id: String,
        #[command(flatten)]
        category: CategoryArgs,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct CategoryArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long = "type", value_enum)]
    pub kind: Direction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Income,
    Expense,
}

impl From<Direction> for CategoryType {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Income => Self::Income,
            Direction::Expense => Self::Expense,
        }
    }
}

impl From<Direction> for TransactionType {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Income => Self::Income,
            Direction::Expense => Self::Expense,
        }
    }
}

#[derive(Args, Debug)]
pub struct DashboardArgs {
    #[arg(long)]
    pub month: Option<u32>,
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long)]
    pub page_size: Option<u32>,
    /// all, income or expense.
    #[arg(long = "type", default_value = "all")]
    pub kind: TransactionFilterType,
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct RecentArgs {
    #[arg(long, default_value_t = finflow_client::transactions::DEFAULT_RECENT_LIMIT)]
    pub limit: u32,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub description: String,
    /// Positive amount; the type gives the direction.
    #[arg(long)]
    pub amount: Decimal,
    #[arg(long = "type", value_enum)]
    pub kind: Direction,
    #[arg(long)]
    pub account: String,
    #[arg(long)]
    pub category: String,
    /// PIX, CREDITO, DEBITO, BOLETO, DINHEIRO or OUTRO.
    #[arg(long, value_parser = parse_payment_method)]
    pub payment_method: PaymentMethod,
    /// YYYY-MM-DD, defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct BrowseArgs {
    #[arg(long = "type", default_value = "all")]
    pub kind: TransactionFilterType,
    #[arg(long)]
    pub page_size: Option<u32>,
}

pub fn parse_payment_method(raw: &str) -> Result<PaymentMethod, String> {
    PaymentMethod::ALL
        .into_iter()
        .find(|method| {
            method.as_str().eq_ignore_ascii_case(raw) || method.label().eq_ignore_ascii_case(raw)
        })
        .ok_or_else(|| format!("unknown payment method: {raw}"))
}
