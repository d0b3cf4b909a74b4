//! Fake identity data for synthetic documents.

use chrono::{Datelike, Days, NaiveDate};
use rand::{Rng, RngCore};

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Daniel", "Nancy", "Matthew", "Lisa", "Anthony", "Betty", "Mark", "Sandra",
    "Steven", "Ashley", "Paul", "Emily", "Andrew", "Donna", "Joshua", "Michelle",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King",
];

const COMPANY_SUFFIXES: &[&str] = &["Inc", "LLC", "Ltd", "Group", "and Sons", "PLC", "Partners"];

const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane", "Drive", "Court", "Way"];

const CITIES: &[&str] = &[
    "Springfield", "Riverside", "Franklin", "Greenville", "Fairview", "Madison", "Georgetown",
    "Salem", "Clinton", "Arlington", "Ashland", "Burlington", "Dayton", "Milton", "Oxford",
];

const STATES: &[&str] = &["CA", "TX", "NY", "FL", "IL", "PA", "OH", "GA", "NC", "MI", "WA", "OR"];

const WORDS: &[&str] = &[
    "paper", "widget", "cable", "monitor", "service", "license", "support", "toner", "chair",
    "desk", "lamp", "adapter", "battery", "router", "keyboard", "bracket", "valve", "filter",
    "sensor", "module", "consulting", "delivery", "maintenance", "storage", "hosting", "training",
];

fn pick(rng: &mut dyn RngCore, list: &'static [&'static str]) -> &'static str {
    list[rng.random_range(0..list.len())]
}

/// A random given name.
pub fn first_name(rng: &mut dyn RngCore) -> &'static str {
    pick(rng, FIRST_NAMES)
}

/// A random family name.
pub fn last_name(rng: &mut dyn RngCore) -> &'static str {
    pick(rng, LAST_NAMES)
}

/// A random full name.
pub fn name(rng: &mut dyn RngCore) -> String {
    format!("{} {}", first_name(rng), last_name(rng))
}

/// A random company name such as "Walker and Sons".
pub fn company(rng: &mut dyn RngCore) -> String {
    match rng.random_range(0..3) {
        0 => format!("{}-{}", last_name(rng), last_name(rng)),
        1 => format!("{}, {} and {}", last_name(rng), last_name(rng), last_name(rng)),
        _ => format!("{} {}", last_name(rng), pick(rng, COMPANY_SUFFIXES)),
    }
}

/// A single-line postal address.
pub fn address(rng: &mut dyn RngCore) -> String {
    format!(
        "{} {} {}, {}, {} {:05}",
        rng.random_range(1..10_000),
        last_name(rng),
        pick(rng, STREET_SUFFIXES),
        pick(rng, CITIES),
        pick(rng, STATES),
        rng.random_range(1_000..100_000),
    )
}

/// A random lowercase noun.
pub fn word(rng: &mut dyn RngCore) -> &'static str {
    pick(rng, WORDS)
}

/// A string of random decimal digits.
pub fn digits(rng: &mut dyn RngCore, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// A string of random uppercase ASCII letters.
pub fn letters(rng: &mut dyn RngCore, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'A' + rng.random_range(0..26u8)))
        .collect()
}

/// A string of random lowercase hex digits.
pub fn hex_id(rng: &mut dyn RngCore, len: usize) -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    (0..len)
        .map(|_| char::from(HEX[rng.random_range(0..HEX.len())]))
        .collect()
}

/// A domestic bank account number: four bank letters then fourteen digits.
pub fn bban(rng: &mut dyn RngCore) -> String {
    format!("{}{}", letters(rng, 4), digits(rng, 14))
}

/// A uniformly random date in `[start, end]`.
///
/// Returns `start` when the range is empty.
pub fn date_between(rng: &mut dyn RngCore, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = (end - start).num_days();
    if span <= 0 {
        return start;
    }
    let offset = rng.random_range(0..=span) as u64;
    start.checked_add_days(Days::new(offset)).unwrap_or(end)
}

/// A random date between January 1st of `today`'s year and `today`.
pub fn date_this_year(rng: &mut dyn RngCore, today: NaiveDate) -> NaiveDate {
    let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
    date_between(rng, start, today)
}

/// A random date between the start of `today`'s decade and `today`.
pub fn date_this_decade(rng: &mut dyn RngCore, today: NaiveDate) -> NaiveDate {
    let decade = today.year() - today.year().rem_euclid(10);
    let start = NaiveDate::from_ymd_opt(decade, 1, 1).unwrap_or(today);
    date_between(rng, start, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_digits_and_letters() {
        let mut rng = StdRng::seed_from_u64(7);
        let d = digits(&mut rng, 8);
        assert_eq!(d.len(), 8);
        assert!(d.chars().all(|c| c.is_ascii_digit()));

        let l = letters(&mut rng, 2);
        assert!(l.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_date_between_is_inclusive_and_bounded() {
        let mut rng = StdRng::seed_from_u64(1);
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        for _ in 0..100 {
            let d = date_between(&mut rng, start, end);
            assert!(d >= start && d <= end);
        }
        assert_eq!(date_between(&mut rng, end, start), end);
    }

    #[test]
    fn test_date_this_decade() {
        let mut rng = StdRng::seed_from_u64(3);
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let d = date_this_decade(&mut rng, today);
        assert!(d.year() >= 2020 && d <= today);
    }
}
