//! Shared fixtures for the service and repository tests.
//!
//! Every test gets a fresh in-memory database seeded with one register,
//! one seller, one credit customer (limit R$ 100,00) and one product
//! (R$ 10,00, 10 in stock).

use chrono::Utc;
use uuid::Uuid;

use crate::pool::{Database, DbConfig};
use caixa_core::{Customer, PaymentMode, Product, Register, SaleDraft, SaleLine, User};

pub(crate) struct Fixture {
    pub db: Database,
    pub register_id: String,
    pub seller_id: String,
    pub customer_id: String,
    pub product_id: String,
}

pub(crate) async fn fixture() -> Fixture {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let now = Utc::now();

    let register = Register {
        id: Uuid::new_v4().to_string(),
        name: "Caixa 1".to_string(),
        location: "Loja".to_string(),
        is_active: true,
        created_at: now,
    };
    db.registers().insert(&register).await.unwrap();

    let seller = User {
        id: Uuid::new_v4().to_string(),
        name: "Operador 1".to_string(),
        email: "operador1@caixa.local".to_string(),
        is_owner: false,
        register_id: Some(register.id.clone()),
        created_at: now,
    };
    db.users().insert(&seller).await.unwrap();

    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        name: "Maria da Silva".to_string(),
        phone: None,
        email: None,
        payment_mode: PaymentMode::Credit,
        credit_limit_cents: 10_000,
        outstanding_cents: 0,
        notes: None,
        created_at: now,
    };
    db.customers().insert(&customer).await.unwrap();

    let product = Product {
        id: Uuid::new_v4().to_string(),
        kind: "bebida".to_string(),
        description: "Refrigerante lata".to_string(),
        price_cents: 1_000,
        stock: 10,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap();

    Fixture {
        db,
        register_id: register.id,
        seller_id: seller.id,
        customer_id: customer.id,
        product_id: product.id,
    }
}

impl Fixture {
    /// A one-line draft against the fixture product.
    pub(crate) fn draft(&self, mode: PaymentMode, quantity: i64) -> SaleDraft {
        SaleDraft {
            customer_id: self.customer_id.clone(),
            seller_id: self.seller_id.clone(),
            register_id: self.register_id.clone(),
            mode,
            lines: vec![SaleLine {
                product_id: self.product_id.clone(),
                quantity,
            }],
            notes: None,
        }
    }

    /// Adds another product with the given price and stock.
    pub(crate) async fn add_product(&self, price_cents: i64, stock: i64) -> String {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            kind: "mercearia".to_string(),
            description: "Arroz 5kg".to_string(),
            price_cents,
            stock,
            created_at: now,
            updated_at: now,
        };
        self.db.products().insert(&product).await.unwrap();
        product.id
    }
}
