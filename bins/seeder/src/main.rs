//! Database seeder for BDN Importacion development and testing.
//!
//! Seeds a few customers and one worked account (a confirmed sale plus a
//! partial payment) for local development. Everything goes through the
//! repositories so document numbers, sequence numbers, and running
//! balances come out the same way production writes them.
//!
//! Usage: cargo run --bin seeder

use std::str::FromStr;

use bdn_core::sales::{IvaRate, PaymentMethod, TaxCategory};
use bdn_db::entities::{customers, sales};
use bdn_db::repositories::{
    CreateCustomerInput, CreatePaymentInput, CreateSaleInput, CreateSaleItemInput,
    CustomerRepository, LedgerRepository, PaymentRepository, SaleRepository,
};
use bdn_shared::types::business_date_today;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = bdn_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding customers...");
    let customer_ids = seed_customers(&db).await;

    println!("Seeding account activity...");
    seed_account_activity(&db, customer_ids.first().copied()).await;

    println!("Seeding complete!");
}

/// Seeds a small customer padron covering the tax categories the
/// invoice-type rules branch on.
async fn seed_customers(db: &DatabaseConnection) -> Vec<Uuid> {
    let seeds = [
        (
            "Ferretería Avellaneda SRL",
            Some("30-65432109-7"),
            Some(TaxCategory::RegisteredResponsible),
            Some("compras@feravellaneda.com.ar"),
        ),
        (
            "María López",
            Some("27-28345678-3"),
            Some(TaxCategory::Monotax),
            None,
        ),
        (
            "Jorge Ramírez",
            Some("28345678"),
            Some(TaxCategory::FinalConsumer),
            None,
        ),
    ];

    let repo = CustomerRepository::new(db.clone());
    let mut ids = Vec::new();

    for (name, tax_id, tax_category, email) in seeds {
        let existing = customers::Entity::find()
            .filter(customers::Column::Name.eq(name))
            .one(db)
            .await
            .ok()
            .flatten();
        if let Some(existing) = existing {
            println!("  Customer {name} already exists, skipping...");
            ids.push(existing.id);
            continue;
        }

        match repo
            .create(CreateCustomerInput {
                name: name.to_string(),
                tax_id: tax_id.map(ToString::to_string),
                tax_category,
                email: email.map(ToString::to_string),
                phone: None,
                address: None,
            })
            .await
        {
            Ok(customer) => {
                println!("  Created customer: {name}");
                ids.push(customer.id.into_inner());
            }
            Err(e) => eprintln!("Failed to insert customer {name}: {e}"),
        }
    }

    ids
}

/// Seeds one worked account: a confirmed two-line sale and a partial
/// payment, both posted to the customer's current account.
async fn seed_account_activity(db: &DatabaseConnection, customer_id: Option<Uuid>) {
    let Some(customer_id) = customer_id else {
        eprintln!("No seeded customer to attach activity to, skipping...");
        return;
    };

    // A customer with any sale already went through this.
    if sales::Entity::find()
        .filter(sales::Column::CustomerId.eq(customer_id))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Account activity already exists, skipping...");
        return;
    }

    let sale_repo = SaleRepository::new(db.clone());
    let ledger = LedgerRepository::new(db.clone());

    let sale = match sale_repo
        .create(CreateSaleInput {
            customer_id,
            sale_date: business_date_today(),
            is_white: true,
            point_of_sale: 1,
            gross_income_perception: Decimal::ZERO,
            items: vec![
                CreateSaleItemInput {
                    description: "Bomba de agua 1/2 HP".to_string(),
                    quantity: Decimal::from(2),
                    unit_price: Decimal::from_str("98500.00").unwrap(),
                    iva_rate: IvaRate::TwentyOne,
                },
                CreateSaleItemInput {
                    description: "Juego de llaves combinadas".to_string(),
                    quantity: Decimal::ONE,
                    unit_price: Decimal::from_str("45200.00").unwrap(),
                    iva_rate: IvaRate::TwentyOne,
                },
            ],
        })
        .await
    {
        Ok(sale) => sale,
        Err(e) => {
            eprintln!("Failed to draft seed sale: {e}");
            return;
        }
    };
    println!("  Drafted sale {} (total {})", sale.number, sale.total);

    let sale = match sale_repo.confirm(sale.id.into_inner()).await {
        Ok(sale) => sale,
        Err(e) => {
            eprintln!("Failed to confirm seed sale: {e}");
            return;
        }
    };
    if let Err(e) = ledger.post_sale_movement(&sale).await {
        eprintln!("Failed to post seed sale debit: {e}");
        return;
    }
    println!("  Confirmed sale {} and posted its debit", sale.number);

    let payment = match PaymentRepository::new(db.clone())
        .create(CreatePaymentInput {
            customer_id,
            amount: Decimal::from_str("150000.00").unwrap(),
            method: PaymentMethod::Transfer,
            payment_date: business_date_today(),
            reference: Some("TRF-0001".to_string()),
        })
        .await
    {
        Ok(payment) => payment,
        Err(e) => {
            eprintln!("Failed to register seed payment: {e}");
            return;
        }
    };
    if let Err(e) = ledger.post_payment_movement(&payment).await {
        eprintln!("Failed to post seed payment credit: {e}");
        return;
    }
    println!("  Registered payment {} and posted its credit", payment.number);

    match ledger.current_balance(customer_id).await {
        Ok(balance) => println!("  Account balance after seeding: {balance}"),
        Err(e) => eprintln!("Failed to read seeded balance: {e}"),
    }
}
