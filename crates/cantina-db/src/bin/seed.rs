//! # Seed Data Loader
//!
//! Loads the demo menu, floor plan, ticket template and settings.
//!
//! ## Usage
//! ```bash
//! # Seed ./cantina.db (or $CANTINA_DB_PATH)
//! cargo run -p cantina-db --bin seed
//!
//! # Specify database path
//! cargo run -p cantina-db --bin seed -- --db ./data/cantina.db
//!
//! # Wipe existing documents first
//! cargo run -p cantina-db --bin seed -- --reset
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::env;
use std::path::PathBuf;

use cantina_core::{
    Category, Money, Product, ProductModifier, ProductVariant, Table, TablePosition, TableStatus,
    TicketTemplate,
};
use cantina_db::{Database, PosConfig, PosService, StorageKey};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// `(id, name, parent)`
const CATEGORIES: &[(&str, &str, Option<&str>)] = &[
    ("1", "Entradas", None),
    ("2", "Platos Principales", None),
    ("3", "Bebidas", None),
    ("4", "Postres", None),
    ("ensaladas", "Ensaladas", Some("1")),
    ("carnes", "Carnes", Some("2")),
    ("gaseosas", "Gaseosas", Some("3")),
    ("pasteles", "Pasteles", Some("4")),
];

/// `(name, pesos centavos, dollar cents)`
type Priced = (&'static str, i64, i64);

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    sku: &'static str,
    category: &'static str,
    price: (i64, i64),
    variants: &'static [Priced],
    /// `(name, pesos centavos)`
    modifiers: &'static [(&'static str, i64)],
}

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Ensalada César",
        description: "Lechuga romana, crutones, queso parmesano",
        sku: "ENS001",
        category: "1",
        price: (18_000, 950),
        variants: &[
            ("Pequeña", 15_000, 800),
            ("Mediana", 18_000, 950),
            ("Grande", 22_000, 1_150),
        ],
        modifiers: &[("Sin crutones", 0), ("Extra queso", 2_500), ("Con pollo", 4_500)],
    },
    DemoProduct {
        name: "Hamburguesa Clásica",
        description: "Carne de res, lechuga, tomate, cebolla",
        sku: "HAM001",
        category: "2",
        price: (25_000, 1_300),
        variants: &[("Simple", 22_000, 1_150), ("Doble carne", 32_000, 1_680)],
        modifiers: &[("Sin cebolla", 0), ("Extra queso", 3_000), ("Con tocino", 4_000)],
    },
    DemoProduct {
        name: "Coca Cola",
        description: "Refresco de cola",
        sku: "BEB001",
        category: "3",
        price: (4_500, 240),
        variants: &[("355ml", 4_500, 240), ("600ml", 6_500, 340)],
        modifiers: &[],
    },
    DemoProduct {
        name: "Tiramisú",
        description: "Postre italiano con café y mascarpone",
        sku: "POS001",
        category: "4",
        price: (12_000, 630),
        variants: &[],
        modifiers: &[("Con helado", 3_500), ("Sin café", 0)],
    },
    DemoProduct {
        name: "Pizza Margherita",
        description: "Salsa de tomate, mozzarella, albahaca",
        sku: "PIZ001",
        category: "2",
        price: (28_000, 1_470),
        variants: &[("Individual", 28_000, 1_470), ("Familiar", 42_000, 2_200)],
        modifiers: &[("Extra mozzarella", 3_500), ("Orilla rellena", 4_000)],
    },
];

/// `(number, seats, x, y)`
const TABLES: &[(u32, u32, i32, i32)] = &[
    (1, 4, 50, 50),
    (3, 6, 350, 50),
    (4, 4, 50, 200),
    (5, 8, 200, 200),
    (6, 2, 350, 200),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = PosConfig::from_env();
    let mut reset = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--reset" => reset = true,
            "--help" | "-h" => {
                println!("Cantina POS Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $CANTINA_DB_PATH or ./cantina.db)");
                println!("      --reset        Remove existing documents before seeding");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let db = Database::new(config.db_config()).await?;
    let pos = PosService::open(db, &config).await?;
    let db = pos.database();

    if reset {
        for key in StorageKey::ALL {
            pos.reset(key).await?;
        }
        info!("Existing documents removed");
    }

    let existing = db.products().count().await?;
    if existing > 0 {
        info!(existing, "Catalog already present, skipping seed (use --reset to reload)");
        return Ok(());
    }

    let categories: Vec<Category> = CATEGORIES
        .iter()
        .map(|&(id, name, parent)| Category {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent.map(str::to_string),
        })
        .collect();
    db.products().replace_categories(&categories).await?;

    let products: Vec<Product> = PRODUCTS.iter().enumerate().map(demo_product).collect();
    db.products().replace_all(&products).await?;

    let tables: Vec<Table> = TABLES
        .iter()
        .map(|&(number, seats, x, y)| Table {
            id: number.to_string(),
            number,
            seats,
            status: TableStatus::Available,
            waiter: None,
            customer: None,
            order_id: None,
            position: TablePosition { x, y },
        })
        .collect();
    pos.replace_tables(&tables).await?;

    db.settings()
        .save_ticket_template(&TicketTemplate::default())
        .await?;
    pos.update_settings(pos.settings()).await?;

    info!(
        path = %config.database_path.display(),
        categories = categories.len(),
        products = products.len(),
        tables = tables.len(),
        "Seed complete"
    );

    let found = db.products().search("queso").await?;
    info!(results = found.len(), "Search 'queso'");

    Ok(())
}

fn demo_product((index, demo): (usize, &DemoProduct)) -> Product {
    let variants = demo
        .variants
        .iter()
        .enumerate()
        .map(|(n, &(name, pesos, dollars))| ProductVariant {
            id: format!("{}-v{}", demo.sku, n + 1),
            name: name.to_string(),
            price_pesos: Money::from_cents(pesos),
            price_dollars: Money::from_cents(dollars),
        })
        .collect();

    let modifiers = demo
        .modifiers
        .iter()
        .enumerate()
        .map(|(n, &(name, price))| ProductModifier {
            id: format!("{}-m{}", demo.sku, n + 1),
            name: name.to_string(),
            price: Money::from_cents(price),
        })
        .collect();

    Product {
        id: (index + 1).to_string(),
        name: demo.name.to_string(),
        description: demo.description.to_string(),
        sku: demo.sku.to_string(),
        category_id: Some(demo.category.to_string()),
        price_pesos: Money::from_cents(demo.price.0),
        price_dollars: Money::from_cents(demo.price.1),
        variants,
        modifiers,
    }
}
