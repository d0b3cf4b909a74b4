//! Synthetic document text generators.
//!
//! Each generator renders one complete document of its type. The data is
//! fake but internally consistent: invoice totals add up, statement
//! balances follow the transactions, and license dates are in order.

use chrono::{Days, Local, NaiveDate};
use rand::{Rng, RngCore};
use rust_decimal::Decimal;

use super::fake;

/// Days added to a license issue date to get its expiry (10 to 20 years).
pub const LICENSE_VALIDITY_DAYS: std::ops::RangeInclusive<u64> = 3650..=7300;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Money amount with two decimal places from a range of cents.
fn money(rng: &mut dyn RngCore, cents: std::ops::RangeInclusive<i64>) -> Decimal {
    Decimal::new(rng.random_range(cents), 2)
}

/// Generate an invoice with 3 to 8 line items.
pub fn invoice_text(rng: &mut dyn RngCore) -> String {
    let invoice_number = fake::hex_id(rng, 8);
    let company_name = fake::company(rng);
    let company_address = fake::address(rng);
    let invoice_date = fake::date_this_year(rng, today());

    let mut invoice = format!(
        "Invoice: {invoice_number}\nCompany: {company_name}\nAddress: {company_address}\nDate: {invoice_date}\n\n"
    );
    invoice.push_str("Items:\n");

    let mut total_amount = Decimal::ZERO;
    for _ in 0..rng.random_range(3..=8) {
        let item_name = capitalize(fake::word(rng));
        let quantity: u32 = rng.random_range(1..=10);
        let price = money(rng, 500..=20_000);
        let item_total = (Decimal::from(quantity) * price).round_dp(2);

        invoice.push_str(&format!(
            "{item_name} (Qty: {quantity}) - ${price:.2} each - Total: ${item_total:.2}\n"
        ));
        total_amount += item_total;
    }

    invoice.push_str(&format!("\nTotal Amount Due: ${:.2}\n", total_amount.round_dp(2)));
    invoice
}

/// Generate a bank statement with 5 to 15 transactions.
pub fn bank_statement_text(rng: &mut dyn RngCore) -> String {
    let account_holder = fake::name(rng);
    let account_number = fake::bban(rng);
    let statement_date = fake::date_this_year(rng, today());

    let mut statement = format!(
        "Bank Statement\nAccount Holder: {account_holder}\nAccount Number: {account_number}\nDate: {statement_date}\n\n"
    );
    statement.push_str("Transactions:\n");

    let period_start = statement_date
        .checked_sub_days(Days::new(30))
        .unwrap_or(statement_date);
    let mut dates: Vec<NaiveDate> = (0..rng.random_range(5..=15))
        .map(|_| fake::date_between(rng, period_start, statement_date))
        .collect();
    dates.sort();

    let mut balance = money(rng, 50_000..=1_000_000);
    for transaction_date in dates {
        let description = fake::company(rng);
        let mut amount = money(rng, 500..=50_000);
        if rng.random_bool(0.6) && amount <= balance {
            amount = -amount;
        }
        balance += amount;

        statement.push_str(&format!(
            "{transaction_date} | {description} | Amount: {} | Balance: ${balance:.2}\n",
            signed_dollars(amount)
        ));
    }

    statement
}

/// Generate a driver's license.
pub fn license_text(rng: &mut dyn RngCore) -> String {
    let today = today();
    let full_name = fake::name(rng);
    let address = fake::address(rng);
    let license_number = format!("{}-{}", fake::letters(rng, 2), fake::digits(rng, 8));

    let youngest = today.checked_sub_days(Days::new(18 * 365 + 5)).unwrap_or(today);
    let oldest = today.checked_sub_days(Days::new(90 * 365 + 22)).unwrap_or(today);
    let date_of_birth = fake::date_between(rng, oldest, youngest);

    let issue_date = fake::date_this_decade(rng, today);
    let validity = rng.random_range(LICENSE_VALIDITY_DAYS);
    let expiry_date = issue_date
        .checked_add_days(Days::new(validity))
        .unwrap_or(NaiveDate::MAX);
    let gender = if rng.random_bool(0.5) { "M" } else { "F" };

    let mut license = format!(
        "Driver's License\nName: {full_name}\nDate of Birth: {}\nGender: {gender}\n",
        date_of_birth.format("%Y-%m-%d")
    );
    license.push_str(&format!(
        "Address: {address}\nLicense Number: {license_number}\nIssue Date: {}\n",
        issue_date.format("%Y-%m-%d")
    ));
    license.push_str(&format!("Expiry Date: {}\n", expiry_date.format("%Y-%m-%d")));
    license
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn signed_dollars(amount: Decimal) -> String {
    if amount.is_sign_negative() {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${amount:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;
    use std::str::FromStr;

    fn field<'a>(text: &'a str, label: &str) -> &'a str {
        text.lines()
            .find_map(|line| line.strip_prefix(label))
            .unwrap_or_else(|| panic!("missing {label} in:\n{text}"))
            .trim()
    }

    #[test]
    fn test_invoice_totals_balance() {
        let item_total = Regex::new(r"- Total: \$(\d+\.\d{2})").unwrap();
        let amount_due = Regex::new(r"Total Amount Due: \$(\d+\.\d{2})").unwrap();

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let text = invoice_text(&mut rng);

            let items: Vec<Decimal> = item_total
                .captures_iter(&text)
                .map(|c| Decimal::from_str(&c[1]).unwrap())
                .collect();
            assert!((3..=8).contains(&items.len()), "{text}");

            let due = Decimal::from_str(&amount_due.captures(&text).unwrap()[1]).unwrap();
            assert_eq!(items.iter().copied().sum::<Decimal>(), due, "{text}");
        }
    }

    #[test]
    fn test_invoice_line_total_matches_quantity_times_price() {
        let line = Regex::new(r"\(Qty: (\d+)\) - \$(\d+\.\d{2}) each - Total: \$(\d+\.\d{2})").unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let text = invoice_text(&mut rng);

        for caps in line.captures_iter(&text) {
            let qty = Decimal::from_str(&caps[1]).unwrap();
            let price = Decimal::from_str(&caps[2]).unwrap();
            let total = Decimal::from_str(&caps[3]).unwrap();
            assert_eq!(qty * price, total);
        }
    }

    #[test]
    fn test_license_expiry_after_issue() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let text = license_text(&mut rng);

            let issue = NaiveDate::parse_from_str(field(&text, "Issue Date:"), "%Y-%m-%d").unwrap();
            let expiry = NaiveDate::parse_from_str(field(&text, "Expiry Date:"), "%Y-%m-%d").unwrap();
            let days = (expiry - issue).num_days() as u64;

            assert!(expiry > issue);
            assert!(LICENSE_VALIDITY_DAYS.contains(&days), "{days} days in:\n{text}");
        }
    }

    #[test]
    fn test_license_holder_is_adult() {
        let mut rng = StdRng::seed_from_u64(5);
        let text = license_text(&mut rng);
        let dob = NaiveDate::parse_from_str(field(&text, "Date of Birth:"), "%Y-%m-%d").unwrap();
        assert!((today() - dob).num_days() >= 18 * 365);
    }

    #[test]
    fn test_statement_balance_follows_transactions() {
        let row = Regex::new(
            r"^(\d{4}-\d{2}-\d{2}) \| .+ \| Amount: (-?)\$(\d+\.\d{2}) \| Balance: \$(\d+\.\d{2})$",
        )
        .unwrap();

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let text = bank_statement_text(&mut rng);
            let statement_date = NaiveDate::parse_from_str(field(&text, "Date:"), "%Y-%m-%d").unwrap();

            let rows: Vec<_> = text.lines().filter_map(|l| row.captures(l)).collect();
            assert!((5..=15).contains(&rows.len()), "{text}");

            let mut previous: Option<(NaiveDate, Decimal)> = None;
            for caps in rows {
                let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").unwrap();
                let mut amount = Decimal::from_str(&caps[3]).unwrap();
                if &caps[2] == "-" {
                    amount = -amount;
                }
                let balance = Decimal::from_str(&caps[4]).unwrap();

                assert!(date <= statement_date);
                assert!(balance >= Decimal::ZERO);
                if let Some((prev_date, prev_balance)) = previous {
                    assert!(date >= prev_date);
                    assert_eq!(prev_balance + amount, balance);
                }
                previous = Some((date, balance));
            }
        }
    }

    #[test]
    fn test_generators_vary_between_calls() {
        let mut rng = StdRng::seed_from_u64(99);
        let first = invoice_text(&mut rng);
        let second = invoice_text(&mut rng);
        assert_ne!(first, second);
        assert!(first.starts_with("Invoice: "));
        assert!(bank_statement_text(&mut rng).starts_with("Bank Statement\n"));
        assert!(license_text(&mut rng).starts_with("Driver's License\n"));
    }
}
