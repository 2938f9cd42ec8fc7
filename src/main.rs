use analytics::{
    SpendingSummary, budget_lines, ensure_categories, load_expenses, reassign_category, reset_budgets,
    sync_budgets,
};
use anyhow::{Context, bail};
use chrono::{Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use configuration::{Config, init_tracing, load_config};
use core_types::{
    Budget, BudgetPeriod, Category, Expense, NOT_STATED_CATEGORY, TIMESTAMP_FORMAT, category_pk_by_name,
    subcategories,
};
use database::{ExpenseRow, Repository, TableRepository, Value};
use rust_decimal::Decimal;

/// The main entry point for the bookkeeper application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    let config = load_config().context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging)?;

    tracing::debug!(database = %config.database.path.display(), "Configuration loaded.");
    let mut app = App::open(&config).await?;

    // Execute the appropriate command
    match cli.command {
        Commands::Expense(command) => app.expense(command).await,
        Commands::Category(command) => app.category(command).await,
        Commands::Budget(command) => app.budget(command).await,
        Commands::Report(args) => app.report(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Records expenses, organises them into categories and tracks budgets.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add, list, edit or delete expenses.
    #[command(subcommand)]
    Expense(ExpenseCommand),
    /// Manage the category tree.
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Set or show the day / week / month budgets.
    #[command(subcommand)]
    Budget(BudgetCommand),
    /// Show spending grouped by category.
    Report(ReportArgs),
}

#[derive(Subcommand)]
enum ExpenseCommand {
    /// Record a new expense.
    Add(AddExpenseArgs),
    /// List all expenses with their category names.
    List,
    /// Change fields of an existing expense.
    Update(UpdateExpenseArgs),
    /// Delete expenses by primary key.
    Delete {
        #[arg(required = true)]
        pks: Vec<i64>,
    },
}

#[derive(Args)]
struct AddExpenseArgs {
    /// The amount spent. Must not be negative.
    #[arg(long)]
    amount: Decimal,

    /// The category name.
    #[arg(long, default_value = NOT_STATED_CATEGORY)]
    category: String,

    /// When the money was spent (format: dd-mm-YYYY HH:MM). Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    date: Option<NaiveDateTime>,

    #[arg(long, default_value = "")]
    comment: String,
}

#[derive(Args)]
struct UpdateExpenseArgs {
    /// Primary key of the expense to change.
    pk: i64,

    #[arg(long)]
    amount: Option<Decimal>,

    #[arg(long)]
    category: Option<String>,

    /// New expense date (format: dd-mm-YYYY HH:MM).
    #[arg(long, value_parser = parse_timestamp)]
    date: Option<NaiveDateTime>,

    #[arg(long)]
    comment: Option<String>,
}

#[derive(Subcommand)]
enum CategoryCommand {
    /// Add a category, optionally below an existing parent.
    Add {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Print the category tree.
    List,
    /// Remove a leaf category. Its expenses move to "Not stated".
    Remove { name: String },
}

#[derive(Subcommand)]
enum BudgetCommand {
    /// Replace the budget limits.
    Set {
        #[arg(long)]
        day: Decimal,
        #[arg(long)]
        week: Decimal,
        #[arg(long)]
        month: Decimal,
    },
    /// Show limits, spending and what is left.
    Show,
}

#[derive(Args)]
struct ReportArgs {
    /// The period to report on (day, week or month).
    #[arg(long, default_value = "day")]
    period: BudgetPeriod,
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| format!("Date {} is incorrect, expected dd-mm-YYYY HH:MM: {}", raw, e))
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// The three table repositories the commands operate on.
struct App {
    expenses: TableRepository<ExpenseRow>,
    categories: TableRepository<Category>,
    budgets: TableRepository<Budget>,
}

impl App {
    async fn open(config: &Config) -> anyhow::Result<Self> {
        let db = &config.database;
        let expenses = TableRepository::new(&db.path, &db.expense_table)
            .await
            .context("Failed to open the expense table")?;
        let categories = TableRepository::new(&db.path, &db.category_table)
            .await
            .context("Failed to open the category table")?;
        let budgets = TableRepository::new(&db.path, &db.budget_table)
            .await
            .context("Failed to open the budget table")?;
        Ok(Self { expenses, categories, budgets })
    }

    async fn category_list(&mut self) -> anyhow::Result<Vec<Category>> {
        Ok(ensure_categories(&mut self.categories).await?)
    }

    async fn expense(&mut self, command: ExpenseCommand) -> anyhow::Result<()> {
        match command {
            ExpenseCommand::Add(args) => {
                let categories = self.category_list().await?;
                let category = category_pk_by_name(&args.category, &categories)?;
                let expense_date = args.date.unwrap_or_else(|| Local::now().naive_local());
                let expense = Expense::new(args.amount, category, expense_date).with_comment(args.comment);

                let mut row = ExpenseRow::new(&expense)?;
                let pk = self.expenses.add(&mut row).await?;
                println!("Added expense #{}.", pk);
                self.refresh_budgets().await?;
            }
            ExpenseCommand::List => {
                self.category_list().await?;
                let expense_pk = format!("{}.pk", self.expenses.table_name());
                let rows = self
                    .expenses
                    .get_join(
                        self.expenses.table_name(),
                        self.categories.table_name(),
                        &[expense_pk.as_str(), "expense_date", "amount", "name", "comment"],
                        "category",
                        "pk",
                    )
                    .await?;

                let mut table = Table::new();
                table.set_header(vec!["#", "Date", "Amount", "Category", "Comment"]);
                for row in &rows {
                    table.add_row(row.iter().map(cell).collect::<Vec<_>>());
                }
                println!("{table}");
            }
            ExpenseCommand::Update(args) => {
                let Some(stored) = self.expenses.get_by_pk(args.pk).await? else {
                    bail!("Expense #{} does not exist", args.pk);
                };
                let mut expense = stored.to_expense()?;
                if let Some(amount) = args.amount {
                    expense.amount = amount;
                }
                if let Some(name) = args.category {
                    let categories = self.category_list().await?;
                    expense.category = category_pk_by_name(&name, &categories)?;
                }
                if let Some(date) = args.date {
                    expense.expense_date = date;
                }
                if let Some(comment) = args.comment {
                    expense.comment = comment;
                }

                let row = ExpenseRow::new(&expense)?;
                self.expenses.update_by_pk(&row).await?;
                println!("Updated expense #{}.", args.pk);
                self.refresh_budgets().await?;
            }
            ExpenseCommand::Delete { pks } => {
                let mut deleted = 0;
                for pk in pks {
                    deleted += self.expenses.delete_by_pk(pk).await?;
                }
                println!("Deleted {} expense(s).", deleted);
                self.refresh_budgets().await?;
            }
        }
        Ok(())
    }

    async fn category(&mut self, command: CategoryCommand) -> anyhow::Result<()> {
        let categories = self.category_list().await?;
        match command {
            CategoryCommand::Add { name, parent } => {
                let name = name.trim().to_string();
                let parent = match parent {
                    Some(parent) => Some(category_pk_by_name(&parent, &categories)?),
                    None => None,
                };
                if categories.iter().any(|c| c.name == name && c.parent == parent) {
                    bail!("Category '{}' already exists at that level", name);
                }
                let pk = self.categories.add(&mut Category::new(name, parent)).await?;
                println!("Added category #{}.", pk);
            }
            CategoryCommand::List => {
                let mut out = String::new();
                for root in categories.iter().filter(|c| c.parent.is_none() && c.name != NOT_STATED_CATEGORY) {
                    render_tree(root, &categories, 0, &mut out);
                }
                print!("{}", out);
            }
            CategoryCommand::Remove { name } => {
                if name == NOT_STATED_CATEGORY {
                    bail!("'{}' cannot be removed", NOT_STATED_CATEGORY);
                }
                let pk = category_pk_by_name(&name, &categories)?;
                let category = categories.iter().find(|c| c.pk == pk).context("category vanished")?;
                if !subcategories(category, &categories).is_empty() {
                    bail!("Category '{}' still has subcategories", name);
                }
                let fallback = category_pk_by_name(NOT_STATED_CATEGORY, &categories)?;
                let moved = reassign_category(&self.expenses, pk, fallback).await?;
                self.categories.delete_by_pk(pk).await?;
                println!("Removed '{}'; {} expense(s) moved to '{}'.", name, moved, NOT_STATED_CATEGORY);
            }
        }
        Ok(())
    }

    async fn budget(&mut self, command: BudgetCommand) -> anyhow::Result<()> {
        if let BudgetCommand::Set { day, week, month } = command {
            if [day, week, month].iter().any(|limit| limit.is_sign_negative() && !limit.is_zero()) {
                bail!("Budget limits must not be negative");
            }
            reset_budgets(&mut self.budgets, day, week, month).await?;
        }

        let budgets = self.refresh_budgets().await?;
        let mut table = Table::new();
        table.set_header(vec!["Period", "Budget", "Spent", "Remaining"]);
        for line in budget_lines(&budgets) {
            table.add_row(vec![
                line.period.to_string(),
                line.budget.to_string(),
                line.spent.to_string(),
                line.remaining.to_string(),
            ]);
        }
        println!("{table}");
        Ok(())
    }

    async fn report(&mut self, args: ReportArgs) -> anyhow::Result<()> {
        let categories_table = self.categories.table_name().to_string();
        let totals = match args.period {
            BudgetPeriod::Day => self.expenses.get_cat_expense_data_day(&categories_table).await?,
            BudgetPeriod::Week => self.expenses.get_cat_expense_data_week(&categories_table).await?,
            BudgetPeriod::Month => self.expenses.get_cat_expense_data_month(&categories_table).await?,
        };

        let mut table = Table::new();
        table.set_header(vec!["Category", "Total"]);
        for total in totals {
            table.add_row(vec![total.category, total.total.to_string()]);
        }
        println!("{table}");
        Ok(())
    }

    /// Recomputes spending and stores it in the three budget rows.
    async fn refresh_budgets(&mut self) -> anyhow::Result<Vec<Budget>> {
        let expenses = load_expenses(&self.expenses).await?;
        let summary = SpendingSummary::from_expenses(&expenses, Local::now().date_naive());
        Ok(sync_budgets(&mut self.budgets, &summary).await?)
    }
}

fn render_tree(category: &Category, categories: &[Category], depth: usize, out: &mut String) {
    out.push_str(&"\t".repeat(depth));
    out.push_str(&category.name);
    out.push('\n');
    for child in subcategories(category, categories) {
        render_tree(child, categories, depth + 1, out);
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Text(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn arguments_parse_on_their_own() {
        let cli = Cli::try_parse_from(["bookkeeper", "report", "--period", "week"]).ok().unwrap();
        assert!(matches!(cli.command, Commands::Report(ReportArgs { period: BudgetPeriod::Week })));

        let cli = Cli::try_parse_from(["bookkeeper", "expense", "add", "--amount", "12.5", "--date", "30-08-2020 08:15"])
            .ok()
            .unwrap();
        let Commands::Expense(ExpenseCommand::Add(args)) = cli.command else {
            panic!("expected expense add");
        };
        assert_eq!(args.category, NOT_STATED_CATEGORY);
        assert_eq!(args.date.unwrap().format(TIMESTAMP_FORMAT).to_string(), "30-08-2020 08:15");

        assert!(Cli::try_parse_from(["bookkeeper", "expense", "add", "--amount", "1", "--date", "2020-08-30"]).is_err());
    }
}
