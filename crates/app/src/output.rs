use api_types::{
    account::Account, category::Category, dashboard::Dashboard, metadata::Metadata,
};
use finflow_client::{TransactionKind, TransactionRecord, TransactionsPage};
use rust_decimal::Decimal;

/// Signed amount: expenses are shown negative.
pub fn signed_amount(kind: TransactionKind, amount: Decimal) -> String {
    let amount = amount.round_dp(2);
    match kind {
        TransactionKind::Income => format!("+{amount:.2}"),
        TransactionKind::Expense => format!("-{amount:.2}"),
    }
}

pub fn transaction_line(record: &TransactionRecord) -> String {
    format!(
        "{:<12} {:<10} {:<28} {:>12}  {:<18} {}",
        record.id,
        record.date.get(..10).unwrap_or(&record.date),
        record.description,
        signed_amount(record.kind, record.amount),
        record.category,
        record.account,
    )
}

pub fn print_transactions(records: &[TransactionRecord]) {
    if records.is_empty() {
        println!("No transactions.");
        return;
    }
    for record in records {
        println!("{}", transaction_line(record));
    }
}

pub fn page_header(page: &TransactionsPage) -> String {
    format!(
        "Page {}/{} ({} transactions)",
        page.meta.page,
        page.meta.total_pages.max(1),
        page.meta.total
    )
}

pub fn print_accounts(accounts: &[Account]) {
    if accounts.is_empty() {
        println!("No accounts.");
        return;
    }
    for account in accounts {
        let balance = account
            .balance
            .map(|balance| format!("{:.2}", balance.round_dp(2)))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<24} {:<12} {:>12}",
            account.id, account.name, account.kind, balance
        );
    }
}

pub fn print_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories.");
        return;
    }
    for category in categories {
        println!(
            "{:<12} {:<24} {}",
            category.id,
            category.name,
            category.kind.as_str()
        );
    }
}

pub fn print_dashboard(month: u32, year: i32, dashboard: &Dashboard) {
    println!("Dashboard {month:02}/{year}");
    println!("  Balance:  {:>12.2}", dashboard.total_balance.round_dp(2));
    println!("  Income:   {:>12.2}", dashboard.monthly_income.round_dp(2));
    println!("  Expenses: {:>12.2}", dashboard.monthly_expense.round_dp(2));
    println!("  Savings:  {:>12.2}", dashboard.monthly_savings.round_dp(2));

    if !dashboard.monthly_summary.is_empty() {
        println!("Monthly summary:");
        for month in &dashboard.monthly_summary {
            println!(
                "  {:<8} +{:<12.2} -{:.2}",
                month.name,
                month.income.round_dp(2),
                month.expense.round_dp(2)
            );
        }
    }
    if !dashboard.expenses_by_category.is_empty() {
        println!("Expenses by category:");
        for category in &dashboard.expenses_by_category {
            println!(
                "  {:<20} {:>12.2}",
                category.name,
                category.value.round_dp(2)
            );
        }
    }
}

pub fn print_metadata(metadata: &Metadata) {
    println!("Payment methods:");
    for method in &metadata.payment_methods {
        println!("  {:<10} {}", method.as_str(), method.label());
    }
}
