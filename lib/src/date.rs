//! Calendar date as the circuits see it: six YYMMDD digits in UTC.

use ark_bn254::Fr;
use chrono::{Datelike, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentDate {
    digits: [u8; 6],
}

impl CurrentDate {
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year().rem_euclid(100) as u8;
        let month = date.month() as u8;
        let day = date.day() as u8;
        Self {
            digits: [year / 10, year % 10, month / 10, month % 10, day / 10, day % 10],
        }
    }

    /// Date from six decimal digits, `None` if any is above nine.
    pub fn from_digits(digits: [u8; 6]) -> Option<Self> {
        digits.iter().all(|d| *d <= 9).then_some(Self { digits })
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    pub fn digits(&self) -> [u8; 6] {
        self.digits
    }

    /// The digits folded into the integer `YYMMDD`, as carried in the public signals.
    pub fn to_field(&self) -> Fr {
        Fr::from(self.digits.iter().fold(0u64, |acc, d| acc * 10 + u64::from(*d)))
    }

    /// One decimal string per digit, as the witness expects.
    pub fn to_decimal_strings(&self) -> Vec<String> {
        self.digits.iter().map(|d| d.to_string()).collect()
    }

    /// Full years elapsed since a `YYMMDD` birth date.
    ///
    /// Two-digit birth years later than the current year are read as the
    /// previous century.
    pub fn years_since(&self, birth: [u8; 6]) -> u32 {
        let fold = |d: &[u8]| d.iter().fold(0u32, |acc, x| acc * 10 + u32::from(*x));
        let (year, month_day) = (fold(&self.digits[..2]), fold(&self.digits[2..]));
        let (birth_year, birth_month_day) = (fold(&birth[..2]), fold(&birth[2..]));

        let birth_full = if birth_year > year { 1900 + birth_year } else { 2000 + birth_year };
        let mut age = (2000 + year).saturating_sub(birth_full);
        if month_day < birth_month_day {
            age = age.saturating_sub(1);
        }
        age
    }
}
