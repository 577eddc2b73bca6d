//! # Seed Data Generator
//!
//! Populates the database with demo promo codes for development.
//!
//! ## Usage
//! ```bash
//! # Named demo codes plus 500 generated ones (default)
//! cargo run -p voyage-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p voyage-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p voyage-db --bin seed -- --db ./data/voyage.db
//! ```
//!
//! ## Generated Codes
//! - `SUMMER20`: 20% off bookings of $500+, capped at $100
//! - `WELCOME50`: $50 off, once per user
//! - `ALPS10`: 10% off, alpine-tours only
//! - `FLASH{NNN}`: alternating percentage / fixed codes, some already expired

use chrono::{Duration, Utc};
use std::env;
use voyage_core::{DiscountType, Money, PromoCode};
use voyage_db::repository::promo::generate_promo_id;
use voyage_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./voyage_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
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
                println!("Voyage Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Generated promo codes (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./voyage_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Voyage Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!("Generated codes: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.promos().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} promo codes", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut promos = demo_promos();
    promos.extend((0..count).map(generated_promo));

    let start = std::time::Instant::now();
    let inserted = db.promos().insert_many(&promos).await?;
    let elapsed = start.elapsed();

    println!("✓ Inserted {} promo codes in {:?}", inserted, elapsed);

    let page = db.promos().list_page(None, 5).await?;
    println!();
    println!("First page:");
    for promo in &page.items {
        println!(
            "  {:<12} {:<10} value={}",
            promo.code,
            promo.discount_type.as_str(),
            promo.discount_value
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn base(code: &str, discount_type: DiscountType, discount_value: i64) -> PromoCode {
    let now = Utc::now();

    PromoCode {
        id: generate_promo_id(),
        code: code.to_string(),
        description: None,
        discount_type,
        discount_value,
        max_discount: None,
        min_purchase_amount: Money::zero(),
        usage_limit: None,
        usage_per_user: None,
        used_count: 0,
        valid_from: now - Duration::days(1),
        valid_until: now + Duration::days(90),
        applicable_trips: vec![],
        applicable_vendors: vec![],
        applicable_categories: vec![],
        excluded_vendors: vec![],
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn demo_promos() -> Vec<PromoCode> {
    let mut summer = base("SUMMER20", DiscountType::Percentage, 2000);
    summer.description = Some("20% off summer trips".to_string());
    summer.min_purchase_amount = Money::from_cents(50_000);
    summer.max_discount = Some(Money::from_cents(10_000));

    let mut welcome = base("WELCOME50", DiscountType::Fixed, 5_000);
    welcome.description = Some("$50 off your first booking".to_string());
    welcome.usage_per_user = Some(1);

    let mut alps = base("ALPS10", DiscountType::Percentage, 1000);
    alps.applicable_vendors = vec!["alpine-tours".to_string()];

    vec![summer, welcome, alps]
}

fn generated_promo(seed: usize) -> PromoCode {
    let mut promo = if seed % 2 == 0 {
        base(
            &format!("FLASH{:03}", seed),
            DiscountType::Percentage,
            500 + ((seed * 37) % 20) as i64 * 100,
        )
    } else {
        base(
            &format!("FLASH{:03}", seed),
            DiscountType::Fixed,
            1_000 + ((seed * 53) % 10) as i64 * 500,
        )
    };

    promo.usage_limit = Some(10 + (seed % 90) as i64);

    // every tenth code is already expired
    if seed % 10 == 9 {
        promo.valid_until = Utc::now() - Duration::days(1);
    }

    promo
}
