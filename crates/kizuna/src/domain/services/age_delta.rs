//! AgeDelta - Age proximity from birthdates

use chrono::{Datelike, NaiveDate};

use crate::domain::errors::DomainError;

/// Whole years reached by `today`
pub fn age_in_years(birthdate: NaiveDate, today: NaiveDate) -> Result<u32, DomainError> {
    if birthdate > today {
        return Err(DomainError::invalid_input(format!(
            "birthdate {} is after {}",
            birthdate, today
        )));
    }
    let mut years = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        years -= 1;
    }
    Ok(years.max(0) as u32)
}

/// 2^(-|age_a - age_b| / half_life_years): 1 for equal ages, halving
/// every `half_life_years` of difference.
pub fn age_proximity(
    birthdate_a: NaiveDate,
    birthdate_b: NaiveDate,
    today: NaiveDate,
    half_life_years: f64,
) -> Result<f64, DomainError> {
    let age_a = age_in_years(birthdate_a, today)?;
    let age_b = age_in_years(birthdate_b, today)?;
    let delta = age_a.abs_diff(age_b) as f64;
    Ok((-delta / half_life_years).exp2())
}
