//! # Seed Data Generator
//!
//! Populates the database with development data: registers, users,
//! customers, products and an expense category.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults
//! cargo run -p caixa-db --bin seed
//!
//! # Generate a custom number of products
//! cargo run -p caixa-db --bin seed -- --products 500
//!
//! # Specify database path
//! cargo run -p caixa-db --bin seed -- --db ./data/caixa.db
//! ```

use chrono::Utc;
use std::env;

use caixa_core::{Customer, ExpenseCategory, PaymentMode, Product, Register, User};
use caixa_db::{Database, DbConfig};
use uuid::Uuid;

/// Product kinds with sample descriptions.
const PRODUCTS: &[(&str, &[&str])] = &[
    (
        "bebida",
        &[
            "Refrigerante lata",
            "Refrigerante 2L",
            "Suco de laranja",
            "Suco de uva",
            "Agua mineral",
            "Agua com gas",
            "Cerveja long neck",
            "Energetico",
            "Cha gelado",
            "Cafe coado",
        ],
    ),
    (
        "lanche",
        &[
            "Salgado de frango",
            "Salgado de queijo",
            "Pao de queijo",
            "Sanduiche natural",
            "Misto quente",
            "Bolo de cenoura",
            "Torta de limao",
            "Pacote de biscoito",
            "Chocolate",
            "Pipoca",
        ],
    ),
    (
        "mercearia",
        &[
            "Arroz 5kg",
            "Feijao 1kg",
            "Acucar 1kg",
            "Sal refinado",
            "Oleo de soja",
            "Farinha de trigo",
            "Macarrao espaguete",
            "Molho de tomate",
            "Leite integral",
            "Ovos duzia",
        ],
    ),
];

const CUSTOMERS: &[(&str, i64)] = &[
    ("Maria da Silva", 20000),
    ("Joao Pereira", 15000),
    ("Ana Costa", 30000),
    ("Carlos Oliveira", 0),
    ("Fernanda Santos", 50000),
    ("Pedro Almeida", 10000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut product_count: usize = 100;
    let mut db_path = String::from("./caixa_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--products" | "-p" => {
                if i + 1 < args.len() {
                    product_count = args[i + 1].parse().unwrap_or(100);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("seed - populate a development database");
                println!();
                println!("  -p, --products <N>  how many products to create (default 100)");
                println!("  -d, --db <PATH>     database file (default ./caixa_dev.db)");
                println!("  -h, --help          this message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Seeding {} with {} products", db_path, product_count);

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("{} already holds {} products; not seeding twice.", db_path, existing);
        println!("Remove the file to start over.");
        return Ok(());
    }

    let now = Utc::now();

    // Registers
    let registers = [
        Register {
            id: Uuid::new_v4().to_string(),
            name: "Caixa 1".to_string(),
            location: "Loja".to_string(),
            is_active: true,
            created_at: now,
        },
        Register {
            id: Uuid::new_v4().to_string(),
            name: "Caixa 2".to_string(),
            location: "Banca da feira".to_string(),
            is_active: true,
            created_at: now,
        },
    ];
    for register in &registers {
        db.registers().insert(register).await?;
    }
    println!("registers: {}", registers.len());

    // Users: one owner plus one operator per register
    let owner = User {
        id: Uuid::new_v4().to_string(),
        name: "Dona Lourdes".to_string(),
        email: "dona@caixa.local".to_string(),
        is_owner: true,
        register_id: None,
        created_at: now,
    };
    db.users().insert(&owner).await?;

    for (idx, register) in registers.iter().enumerate() {
        let operator = User {
            id: Uuid::new_v4().to_string(),
            name: format!("Operador {}", idx + 1),
            email: format!("operador{}@caixa.local", idx + 1),
            is_owner: false,
            register_id: Some(register.id.clone()),
            created_at: now,
        };
        db.users().insert(&operator).await?;
    }
    println!("users: {} (1 owner)", registers.len() + 1);

    // Customers
    for (name, credit_limit_cents) in CUSTOMERS {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: None,
            email: None,
            payment_mode: if *credit_limit_cents > 0 {
                PaymentMode::Credit
            } else {
                PaymentMode::Cash
            },
            credit_limit_cents: *credit_limit_cents,
            outstanding_cents: 0,
            notes: None,
            created_at: now,
        };
        db.customers().insert(&customer).await?;
    }
    println!("customers: {}", CUSTOMERS.len());

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: loop {
        for (kind, descriptions) in PRODUCTS {
            for description in descriptions.iter() {
                if generated >= product_count {
                    break 'outer;
                }

                let product = generate_product(kind, description, generated);
                db.products().insert(&product).await?;
                generated += 1;

                if generated % 50 == 0 {
                    println!("products: {}...", generated);
                }
            }
        }
    }

    println!("products: {} in {:?}", generated, start.elapsed());

    // Expense category
    let category = ExpenseCategory {
        id: Uuid::new_v4().to_string(),
        name: "Fornecedores".to_string(),
        description: Some("Compras de mercadoria".to_string()),
        created_at: now,
    };
    db.expenses().insert_category(&category).await?;
    println!("expense category: {}", category.name);

    println!("done");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(kind: &str, description: &str, seed: usize) -> Product {
    let now = Utc::now();

    // Price: R$ 1,99 - R$ 24,99
    let price_cents = 199 + ((seed * 37) % 2300) as i64;

    // Stock: 0 - 60
    let stock = ((seed * 13) % 61) as i64;

    // Repeat rounds get a numbered suffix to stay distinguishable
    let description = if seed >= 30 {
        format!("{} #{}", description, seed / 30 + 1)
    } else {
        description.to_string()
    };

    Product {
        id: Uuid::new_v4().to_string(),
        kind: kind.to_string(),
        description,
        price_cents,
        stock,
        created_at: now,
        updated_at: now,
    }
}
