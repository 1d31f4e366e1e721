//! # Seed Data Generator
//!
//! Populates a development database with a small, realistic eatery setup:
//! ingredients with opening stock, priced recipes, menu products, staff,
//! recurring expenses, and a handful of sales so every report has data.
//!
//! ## Usage
//! ```bash
//! cargo run -p kusina-db --bin seed --features seed-bin
//!
//! # Specify database path
//! cargo run -p kusina-db --bin seed --features seed-bin -- --db ./data/kusina.db
//! ```

use std::env;

use chrono::Local;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kusina_core::{
    EmployeeRole, ExpenseCategory, NewEmployee, NewExpense, NewIngredient, NewProduct,
    NewRecipe, NewRecipeItem, NewSale, NewSaleItem, PaymentMethod, ProductCategory,
    RecurrenceType, WageType,
};
use kusina_db::{Database, DbConfig};

/// name, cost per unit in centavos, unit, opening stock, low-stock threshold
const INGREDIENTS: &[(&str, i64, &str, f64, f64)] = &[
    ("Flour", 5000, "kg", 25.0, 5.0),
    ("Sugar", 8000, "kg", 10.0, 2.0),
    ("Eggs", 900, "pc", 60.0, 12.0),
    ("Cooking Oil", 12000, "L", 8.0, 2.0),
    ("Rice", 5500, "kg", 50.0, 10.0),
    ("Pork", 32000, "kg", 12.0, 3.0),
    ("Garlic", 18000, "kg", 2.0, 0.5),
    ("Soy Sauce", 9000, "L", 4.0, 1.0),
    ("Coffee Beans", 60000, "kg", 3.0, 0.5),
    ("Evaporated Milk", 4500, "pc", 24.0, 6.0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./kusina_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kusina POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./kusina_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(path = %db_path, "Seeding development database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    if !db.ingredients().list().await?.is_empty() {
        info!("Database already has data; skipping seed. Delete the file to regenerate.");
        return Ok(());
    }

    // Ingredients, with opening stock flowing through the ledger.
    let mut ingredient_ids = Vec::new();
    for &(name, cost, unit, opening, threshold) in INGREDIENTS {
        let ingredient = db
            .ingredients()
            .create(&NewIngredient {
                name: name.to_string(),
                cost_per_unit_cents: cost,
                unit_type: unit.to_string(),
                low_stock_threshold: threshold,
                supplier: Some("Divisoria Wholesale".to_string()),
                expiration_date: None,
                opening_stock: Some(opening),
            })
            .await?;
        ingredient_ids.push(ingredient.id);
    }
    info!(count = ingredient_ids.len(), "Ingredients created");

    // Recipes. Indices follow the INGREDIENTS table above.
    let pandesal = db
        .recipes()
        .create(&NewRecipe {
            name: "Pandesal".to_string(),
            servings: 20,
            items: vec![
                NewRecipeItem {
                    ingredient_id: ingredient_ids[0], // Flour
                    quantity: 1.0,
                    unit_type: "kg".to_string(),
                },
                NewRecipeItem {
                    ingredient_id: ingredient_ids[1], // Sugar
                    quantity: 0.2,
                    unit_type: "kg".to_string(),
                },
                NewRecipeItem {
                    ingredient_id: ingredient_ids[2], // Eggs
                    quantity: 4.0,
                    unit_type: "pc".to_string(),
                },
            ],
        })
        .await?;

    let adobo = db
        .recipes()
        .create(&NewRecipe {
            name: "Pork Adobo".to_string(),
            servings: 6,
            items: vec![
                NewRecipeItem {
                    ingredient_id: ingredient_ids[5], // Pork
                    quantity: 1.0,
                    unit_type: "kg".to_string(),
                },
                NewRecipeItem {
                    ingredient_id: ingredient_ids[6], // Garlic
                    quantity: 0.05,
                    unit_type: "kg".to_string(),
                },
                NewRecipeItem {
                    ingredient_id: ingredient_ids[7], // Soy Sauce
                    quantity: 0.2,
                    unit_type: "L".to_string(),
                },
            ],
        })
        .await?;

    let kape = db
        .recipes()
        .create(&NewRecipe {
            name: "Kapeng Barako".to_string(),
            servings: 25,
            items: vec![
                NewRecipeItem {
                    ingredient_id: ingredient_ids[8], // Coffee Beans
                    quantity: 0.25,
                    unit_type: "kg".to_string(),
                },
                NewRecipeItem {
                    ingredient_id: ingredient_ids[9], // Evaporated Milk
                    quantity: 5.0,
                    unit_type: "pc".to_string(),
                },
            ],
        })
        .await?;
    info!("Recipes created and costed");

    // Menu products.
    let mut product_ids = Vec::new();
    for (name, category, price, recipe_id) in [
        ("Pandesal", ProductCategory::Food, 500, Some(pandesal.id)),
        ("Pork Adobo Meal", ProductCategory::Food, 9500, Some(adobo.id)),
        ("Kapeng Barako", ProductCategory::Beverage, 3500, Some(kape.id)),
        ("Bottled Water", ProductCategory::Beverage, 2000, None),
        ("Leche Flan", ProductCategory::Dessert, 4500, None),
    ] {
        let product = db
            .products()
            .create(&NewProduct {
                name: name.to_string(),
                category,
                selling_price_cents: price,
                recipe_id,
                is_inventory_tracked: recipe_id.is_some(),
            })
            .await?;
        product_ids.push(product.id);
    }
    info!(count = product_ids.len(), "Products created");

    // Staff and recurring expenses for the break-even report.
    db.employees()
        .create(&NewEmployee {
            name: "Aling Nena".to_string(),
            role: EmployeeRole::Owner,
            wage_type: WageType::Monthly,
            wage_rate_cents: 0,
            contact_number: None,
        })
        .await?;
    db.employees()
        .create(&NewEmployee {
            name: "Jun Reyes".to_string(),
            role: EmployeeRole::Cashier,
            wage_type: WageType::Daily,
            wage_rate_cents: 61_000,
            contact_number: Some("0917-555-0199".to_string()),
        })
        .await?;

    let today = Local::now().date_naive();
    db.expenses()
        .create(&NewExpense {
            description: "Stall rent".to_string(),
            category: ExpenseCategory::Rent,
            amount_cents: 1_500_000,
            recurrence_type: Some(RecurrenceType::Monthly),
            expense_date: today,
        })
        .await?;
    db.expenses()
        .create(&NewExpense {
            description: "LPG refill".to_string(),
            category: ExpenseCategory::Utilities,
            amount_cents: 95_000,
            recurrence_type: None,
            expense_date: today,
        })
        .await?;

    // A few sales so reports have something to aggregate.
    for (product_idx, quantity, method) in [
        (0, 10, PaymentMethod::Cash),
        (1, 2, PaymentMethod::Gcash),
        (2, 3, PaymentMethod::Cash),
        (0, 20, PaymentMethod::Maya),
        (4, 1, PaymentMethod::Cash),
    ] {
        db.sales()
            .record_sale(&NewSale {
                items: vec![NewSaleItem {
                    product_id: product_ids[product_idx],
                    quantity,
                }],
                discount_amount_cents: 0,
                discount_percent: 0.0,
                payment_method: method,
                amount_received_cents: 100_000,
            })
            .await?;
    }
    info!("Sample sales recorded");

    let report = db.reports().daily_report(today).await?;
    info!(
        transactions = report.transaction_count,
        total_cents = report.total_cents,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}
