use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
};

use clap::{Args as ClapArgs, Parser, Subcommand};
use rusqlite::Connection;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use wings_inventory::{
    Error, Inventory, LogInForm, PasswordHash, ProductForm, ProductId, SignUpForm,
    StockChangeForm, UserUpdate,
};

/// Manage the Wings Cafe product catalog, stock ledger and staff accounts.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The log filter to use when `RUST_LOG` is not set, e.g. "debug".
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the product catalog.
    #[command(subcommand)]
    Product(ProductCommand),
    /// Add or deduct stock.
    #[command(subcommand)]
    Stock(StockCommand),
    /// View or delete recorded stock changes.
    #[command(subcommand)]
    Ledger(LedgerCommand),
    /// Show the stock value, inventory table and chart data.
    Dashboard {
        /// Print the dashboard as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Manage staff accounts.
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(ClapArgs, Debug)]
struct ProductFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    category: String,
    #[arg(long)]
    price: String,
    #[arg(long)]
    quantity: String,
}

impl From<ProductFields> for ProductForm {
    fn from(fields: ProductFields) -> Self {
        Self {
            name: fields.name,
            description: fields.description,
            category: fields.category,
            price: fields.price,
            quantity: fields.quantity,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ProductCommand {
    /// Add a product to the catalog.
    Add(ProductFields),
    /// List every product.
    List,
    /// Overwrite a product's details.
    Update {
        /// The ID of the product to edit.
        id: String,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product. Its ledger entries are kept.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum StockCommand {
    /// Receive units into stock.
    Add { product_name: String, quantity: String },
    /// Take units out of stock.
    Deduct { product_name: String, quantity: String },
}

#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// List every recorded stock change.
    List,
    /// Delete a recorded stock change by its ID.
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an account. The password is read from the terminal.
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        position: String,
        #[arg(long)]
        id_number: String,
        #[arg(long)]
        phone_number: String,
    },
    /// Check a username and password. The password is read from the terminal.
    Login {
        #[arg(long)]
        username: String,
    },
    /// List every account.
    List,
    /// Change an account's profile details.
    Update {
        id_number: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        position: String,
        #[arg(long)]
        phone_number: String,
    },
    /// Delete an account.
    Delete {
        id_number: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(&args.log_level);

    let inventory = match Connection::open(&args.db_path)
        .map_err(Error::from)
        .and_then(Inventory::new)
    {
        Ok(inventory) => inventory,
        Err(error) => {
            print_error(format!("Could not open the database at {}: {error}", args.db_path));
            return ExitCode::FAILURE;
        }
    };

    match run(args.command, &inventory) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Validation(errors)) => {
            for error in errors.errors() {
                print_error(&error.message);
            }
            ExitCode::FAILURE
        }
        Err(error) => {
            print_error(error);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_log).init();
}

fn run(command: Command, inventory: &Inventory) -> Result<(), Error> {
    match command {
        Command::Product(command) => run_product(command, inventory),
        Command::Stock(command) => run_stock(command, inventory),
        Command::Ledger(command) => run_ledger(command, inventory),
        Command::Dashboard { json } => print_dashboard(inventory, json),
        Command::User(command) => run_user(command, inventory),
    }
}

fn run_product(command: ProductCommand, inventory: &Inventory) -> Result<(), Error> {
    match command {
        ProductCommand::Add(fields) => {
            let candidate = ProductForm::from(fields).validate()?;
            let product = inventory.create_local_product(candidate)?;
            println!("Product added successfully: {} (ID {})", product.name, product.id);
        }
        ProductCommand::List => {
            println!("ID\tName\tDescription\tCategory\tPrice\tQuantity");
            for product in inventory.products()? {
                println!(
                    "{}\t{}\t{}\t{}\t{:.2}\t{}",
                    product.id,
                    product.name,
                    product.description,
                    product.category,
                    product.price,
                    product.quantity
                );
            }
        }
        ProductCommand::Update { id, fields } => {
            let product = ProductForm::from(fields).validate_edit(ProductId::new(&id))?;
            inventory.update_product(&product)?;
            println!("Product updated successfully");
        }
        ProductCommand::Delete { id, yes } => {
            if yes || confirm("Are you sure you want to delete this product?") {
                inventory.delete_product(&ProductId::new(&id))?;
                println!("Product deleted successfully");
            }
        }
    }

    Ok(())
}

fn run_stock(command: StockCommand, inventory: &Inventory) -> Result<(), Error> {
    let form = match command {
        StockCommand::Add {
            product_name,
            quantity,
        } => StockChangeForm {
            product_name,
            action: "add".to_owned(),
            quantity,
        },
        StockCommand::Deduct {
            product_name,
            quantity,
        } => StockChangeForm {
            product_name,
            action: "deduct".to_owned(),
            quantity,
        },
    };

    let change = form.validate(now())?;
    let entry = inventory.apply_stock_change(change)?;
    println!(
        "Stock updated successfully: {} {} of {}",
        entry.action.label(),
        entry.quantity,
        entry.product_name
    );

    Ok(())
}

fn run_ledger(command: LedgerCommand, inventory: &Inventory) -> Result<(), Error> {
    match command {
        LedgerCommand::List => {
            println!("ID\tStock Name\tQuantity Changed\tAction\tDate & Time");
            for entry in inventory.transactions()? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    entry.id,
                    entry.product_name,
                    entry.quantity,
                    entry.action.label(),
                    format_timestamp(entry.timestamp)
                );
            }
        }
        LedgerCommand::Delete { id, yes } => {
            if yes || confirm("Are you sure you want to delete this transaction?") {
                inventory.delete_transaction(id)?;
                println!("Transaction deleted successfully");
            }
        }
    }

    Ok(())
}

fn print_dashboard(inventory: &Inventory, as_json: bool) -> Result<(), Error> {
    let dashboard = inventory.dashboard()?;

    if as_json {
        println!("{}", dashboard.to_json()?);
        return Ok(());
    }

    println!("Total Stock Value: M{:.2}", dashboard.total_stock_value());
    println!();
    println!("Product Name\tQuantity\tPrice\tStock Level\tSold Stock\tSold Products\tLedger Sold");
    for row in dashboard.product_rows() {
        println!(
            "{}\t{}\tM{:.2}\t{}\t{}\t{}\t{}",
            row.name,
            row.quantity,
            row.price,
            row.stock_level.label(),
            row.sold_quantity,
            if row.sold { "Yes" } else { "No" },
            row.ledger_sold_quantity
        );
    }

    if dashboard.products.is_empty() {
        println!("No Products Available");
    }

    Ok(())
}

fn run_user(command: UserCommand, inventory: &Inventory) -> Result<(), Error> {
    match command {
        UserCommand::Signup {
            username,
            position,
            id_number,
            phone_number,
        } => {
            let form = SignUpForm {
                username,
                password: prompt_password("Password: "),
                position,
                id_number,
                phone_number,
            };
            let user = inventory.sign_up(form.validate(PasswordHash::DEFAULT_COST)?)?;
            println!("Account created successfully for {}", user.username);
        }
        UserCommand::Login { username } => {
            let form = LogInForm {
                username,
                password: prompt_password("Password: "),
            };
            let user = inventory.log_in(&form)?;
            println!("Logged in as {} ({})", user.username, user.position);
        }
        UserCommand::List => {
            println!("Name\tID Number\tPhone Number\tPosition");
            for user in inventory.users()? {
                println!(
                    "{}\t{}\t{}\t{}",
                    user.username, user.id_number, user.phone_number, user.position
                );
            }
        }
        UserCommand::Update {
            id_number,
            username,
            position,
            phone_number,
        } => {
            inventory.update_user(&UserUpdate {
                id_number,
                username,
                position,
                phone_number,
            })?;
            println!("User updated successfully");
        }
        UserCommand::Delete { id_number, yes } => {
            if yes || confirm("Are you sure you want to delete this user?") {
                inventory.delete_user(&id_number)?;
                println!("User deleted successfully");
            }
        }
    }

    Ok(())
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| timestamp.to_string())
}

/// An empty password is returned if it cannot be read, which the forms reject.
fn prompt_password(prompt: &str) -> String {
    match rpassword::prompt_password(prompt) {
        Ok(password) => password,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            String::new()
        }
    }
}

fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }

    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
