use api_types::{
    account::AccountInput, category::CategoryInput, transaction::TransactionNew,
};
use chrono::{Datelike, Local};
use finflow_client::{Client, TransactionFilter};

use crate::{
    browse,
    cli::{AccountCommand, AddArgs, CategoryCommand, Command, DashboardArgs, ListArgs},
    config::AppConfig,
    error::{AppError, Result},
    output, prompt, session_file,
};

pub fn client(settings: &AppConfig) -> Result<Client> {
    let mut builder = Client::builder(settings.base_url.clone()).cache_config(settings.cache());
    if let Some(timeout) = settings.request_timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(session) = session_file::load(&settings.session_path)? {
        tracing::debug!(user_id = %session.user_id, "restored session");
        builder = builder.session(session);
    }
    Ok(builder.build()?)
}

pub async fn run(command: Command, settings: &AppConfig) -> Result<()> {
    let client = client(settings)?;

    match command {
        Command::Login => login(&client, settings).await,
        Command::Register(args) => {
            let email = email(settings)?;
            let password = prompt::new_password()?;
            client.auth().register(&args.name, &email, &password).await?;
            println!("Account created for {email}. You can log in now.");
            Ok(())
        }
        Command::Logout => {
            client.auth().logout();
            session_file::remove(&settings.session_path)?;
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => {
            let session = client.session().current().ok_or(AppError::NotLoggedIn)?;
            println!("{} ({})", session.display_name, session.user_id);
            Ok(())
        }
        command => {
            if !client.session().is_authenticated() {
                return Err(AppError::NotLoggedIn);
            }
            authenticated(command, &client, settings).await
        }
    }
}

async fn authenticated(command: Command, client: &Client, settings: &AppConfig) -> Result<()> {
    match command {
        Command::Accounts(accounts) => match accounts.command {
            AccountCommand::List => {
                let accounts = client.accounts().list().await?;
                output::print_accounts(&accounts);
            }
            AccountCommand::Create(args) => {
                let account = client
                    .accounts()
                    .create(&AccountInput {
                        name: args.name,
                        kind: args.kind,
                    })
                    .await?;
                println!("Created account {} ({}).", account.name, account.id);
            }
            AccountCommand::Update { id, account } => {
                let account = client
                    .accounts()
                    .update(
                        &id,
                        &AccountInput {
                            name: account.name,
                            kind: account.kind,
                        },
                    )
                    .await?;
                println!("Updated account {} ({}).", account.name, account.id);
            }
            AccountCommand::Delete { id } => {
                client.accounts().delete(&id).await?;
                println!("Deleted account {id}.");
            }
        },
        Command::Categories(categories) => match categories.command {
            CategoryCommand::List { kind } => {
                let categories = client.categories().list(kind.map(Into::into)).await?;
                output::print_categories(&categories);
            }
            CategoryCommand::Create(args) => {
                let category = client
                    .categories()
                    .create(&CategoryInput {
                        name: args.name,
                        kind: args.kind.into(),
                    })
                    .await?;
                println!("Created category {} ({}).", category.name, category.id);
            }
            CategoryCommand::Update { id, category } => {
                let category = client
                    .categories()
                    .update(
                        &id,
                        &CategoryInput {
                            name: category.name,
                            kind: category.kind.into(),
                        },
                    )
                    .await?;
                println!("Updated category {} ({}).", category.name, category.id);
            }
            CategoryCommand::Delete { id } => {
                client.categories().delete(&id).await?;
                println!("Deleted category {id}.");
            }
        },
        Command::Dashboard(args) => dashboard(client, args).await?,
        Command::Metadata => {
            let metadata = client.metadata().get().await?;
            output::print_metadata(&metadata);
        }
        Command::Transactions(args) => list(client, settings, args).await?,
        Command::Recent(args) => {
            let recent = client.transactions().recent(args.limit).await?;
            output::print_transactions(&recent);
        }
        Command::Add(args) => add(client, args).await?,
        Command::Delete { id } => {
            client.transactions().delete(&id).await?;
            println!("Deleted transaction {id}.");
        }
        Command::Browse(args) => browse::run(client.clone(), settings, args).await?,
        Command::Login | Command::Register(_) | Command::Logout | Command::Whoami => {}
    }
    Ok(())
}

async fn login(client: &Client, settings: &AppConfig) -> Result<()> {
    let email = email(settings)?;
    let password = prompt::password("Password: ")?;
    let session = client.auth().login(&email, &password).await?;
    session_file::save(&settings.session_path, &session)?;
    println!("Logged in as {}.", session.display_name);
    Ok(())
}

fn email(settings: &AppConfig) -> Result<String> {
    if !settings.email.trim().is_empty() {
        return Ok(settings.email.trim().to_string());
    }
    let email = prompt::line("Email: ")?;
    if email.is_empty() {
        return Err(AppError::Input("email must not be empty".to_string()));
    }
    Ok(email)
}

async fn dashboard(client: &Client, args: DashboardArgs) -> Result<()> {
    let today = Local::now().date_naive();
    let month = args.month.unwrap_or_else(|| today.month());
    let year = args.year.unwrap_or_else(|| today.year());
    let dashboard = client.dashboard().summary(month, year).await?;
    output::print_dashboard(month, year, &dashboard);
    Ok(())
}

async fn list(client: &Client, settings: &AppConfig, args: ListArgs) -> Result<()> {
    let filter = TransactionFilter::new()
        .with_page_size(args.page_size.unwrap_or(settings.page_size))
        .with_kind(args.kind)
        .with_search(args.search.as_deref().unwrap_or_default())
        .with_page(args.page);
    let page = client.transactions().list(&filter).await?;
    println!("{}", output::page_header(&page));
    output::print_transactions(&page.items);
    Ok(())
}

async fn add(client: &Client, args: AddArgs) -> Result<()> {
    let input = TransactionNew {
        description: args.description,
        amount: args.amount,
        kind: args.kind.into(),
        payment_method: args.payment_method,
        account_id: args.account,
        category_id: args.category,
        date: args.date.unwrap_or_else(|| Local::now().date_naive()),
    };
    let record = client.transactions().create(&input).await?;
    println!("Created transaction:");
    println!("{}", output::transaction_line(&record));
    Ok(())
}
