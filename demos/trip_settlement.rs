//! Trip settlement example: three friends, two currencies, one partial payment

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::str::FromStr;

use tripsplit_core::utils::MemoryStorage;
use tripsplit_core::{
    format_money, ExpenseCategory, ExpenseDraftBuilder, Member, PaymentMethod, RateTable,
    SplitSpec, Trip, TripEngine, TripSession, TripSummary,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧳 Tripsplit Core - Trip Settlement Example\n");

    // 1. Create the trip
    let trip = Trip::new(
        "goa".to_string(),
        "Goa 2024".to_string(),
        "INR".to_string(),
        vec!["USD".to_string()],
        vec![
            Member::new("asha", "Asha"),
            Member::new("bilal", "Bilal"),
            Member::new("chen", "Chen"),
        ],
    );
    let members = trip.members.clone();
    let mut session = TripSession::create(MemoryStorage::new(), TripEngine::default(), trip).await?;
    println!("  ✓ Created trip with {} members\n", members.len());

    // 2. Load today's rates
    let mut rates = HashMap::new();
    rates.insert("USD".to_string(), BigDecimal::from_str("83.02")?);
    session
        .replace_rates(RateTable::new("INR".to_string(), rates, Utc::now()))
        .await?;
    println!("  ✓ Loaded rates: 1 USD = ₹83.02\n");

    // 3. Record expenses
    println!("🧾 Recording Expenses...\n");

    let villa = ExpenseDraftBuilder::new(
        "Beach villa",
        "asha",
        BigDecimal::from(9000),
        "INR",
        &members,
    )
    .category(ExpenseCategory::Accommodation)
    .date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    .build();
    let villa = session.add_expense(villa, false).await?;
    print_expense(&villa.title, &villa.amount_base);

    let dinner = ExpenseDraftBuilder::new(
        "Seafood dinner",
        "bilal",
        BigDecimal::from(42),
        "USD",
        &members,
    )
    .category(ExpenseCategory::Food)
    .date(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap())
    .build();
    let dinner = session.add_expense(dinner, false).await?;
    print_expense(&dinner.title, &dinner.amount_base);

    let mut shares = HashMap::new();
    shares.insert("bilal".to_string(), BigDecimal::from(1));
    shares.insert("chen".to_string(), BigDecimal::from(2));
    let scooters = ExpenseDraftBuilder::new(
        "Scooter rental",
        "chen",
        BigDecimal::from(1200),
        "INR",
        &members,
    )
    .category(ExpenseCategory::Transport)
    .split(SplitSpec::Shares { shares })
    .date(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap())
    .build();
    let scooters = session.add_expense(scooters, false).await?;
    print_expense(&scooters.title, &scooters.amount_base);
    println!();

    // 4. Balances and suggestions
    let summary = session.summary();
    print_summary(&summary);

    // 5. Chen pays part of their debt
    println!("💸 Recording Payments...\n");
    if let Some(suggestion) = summary.pending_payments_for("chen").first() {
        let suggestion = (*suggestion).clone();
        let settlement = session
            .record_settlement(&suggestion, BigDecimal::from(1000), PaymentMethod::Upi, true)
            .await?;
        println!(
            "  ⚡ Partial payment of {} via {} recorded, {} still outstanding",
            format_money(&settlement.amount, "INR", 2),
            settlement.method,
            format_money(
                &session
                    .engine()
                    .settlements
                    .outstanding(&suggestion, &settlement.amount),
                "INR",
                2
            )
        );
    }

    // 6. Everyone else pays in full
    for suggestion in session.summary().suggestions {
        let amount = suggestion.amount.clone();
        session
            .record_settlement(&suggestion, amount, PaymentMethod::Cash, false)
            .await?;
        println!(
            "  ✓ {} paid {} {}",
            suggestion.from_member_id,
            suggestion.to_member_id,
            format_money(&suggestion.amount, "INR", 2)
        );
    }
    println!();

    print_summary(&session.summary());
    println!(
        "🎉 Trip settled: {} ({} payments)",
        session.trip().is_settled,
        session.activity().len()
    );

    Ok(())
}

fn print_expense(title: &str, amount_base: &BigDecimal) {
    println!("  ✓ Recorded: {} of {}", title, format_money(amount_base, "INR", 2));
}

fn print_summary(summary: &TripSummary) {
    println!("📊 Balances");
    for balance in &summary.balances {
        println!(
            "  {:<8} {:>14}",
            balance.display_name,
            format_money(&balance.net_amount, &summary.base_currency, 2)
        );
    }
    println!("\n🔁 Suggested transfers");
    if summary.suggestions.is_empty() {
        println!("  nothing left to settle");
    }
    for transfer in &summary.suggestions {
        println!(
            "  {} → {}: {}",
            transfer.from_member_id,
            transfer.to_member_id,
            format_money(&transfer.amount, &transfer.currency, 2)
        );
    }
    println!();
}
