use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::OffsetDateTime;

use wings_inventory::{Inventory, NewProduct, NewUser, PasswordHash, StockAction, StockChange};

/// A utility for creating a test database for the Wings Cafe inventory tool.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let inventory = Inventory::new(Connection::open(output_path)?)?;

    println!("Creating test user...");

    inventory.sign_up(NewUser {
        id_number: "0001".to_owned(),
        username: "test".to_owned(),
        password_hash: PasswordHash::new("test", PasswordHash::DEFAULT_COST)?,
        position: "Manager".to_owned(),
        phone_number: "5800 0000".to_owned(),
    })?;

    println!("Creating test products...");

    let products = [
        ("Tea", "Black tea", "Drinks", 10.0, 20),
        ("Coffee", "Filter coffee", "Drinks", 15.0, 12),
        ("Muffin", "Blueberry muffin", "Bakery", 18.5, 4),
        ("Sandwich", "Chicken mayo on white", "Food", 35.0, 0),
    ];

    for (name, description, category, price, quantity) in products {
        inventory.create_local_product(NewProduct {
            name: name.to_owned(),
            description: description.to_owned(),
            category: category.to_owned(),
            price,
            quantity,
        })?;
    }

    println!("Recording test stock changes...");

    let now = OffsetDateTime::now_utc();
    let changes = [
        ("Tea", StockAction::Deduct, 5),
        ("Coffee", StockAction::Add, 6),
        ("Muffin", StockAction::Deduct, 2),
    ];

    for (product_name, action, amount) in changes {
        inventory.apply_stock_change(StockChange {
            product_name: product_name.to_owned(),
            action,
            amount,
            timestamp: now,
        })?;
    }

    println!("Success!");

    Ok(())
}
