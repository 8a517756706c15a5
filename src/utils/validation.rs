use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use validator::{ValidationError, ValidationErrors};

/// Première projection du cinéma (frères Lumière), borne incluse
pub static CINEMA_BIRTHDAY: LazyLock<NaiveDate> = LazyLock::new(|| {
    NaiveDate::from_ymd_opt(1895, 12, 28).expect("Failed to build cinema birthday")
});

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_login(login: &str) -> Result<(), ValidationError> {
    if login.trim().is_empty() {
        return Err(error("login", "Empty Login"));
    }
    if login.chars().any(char::is_whitespace) {
        return Err(error("login", "Incorrect Login"));
    }
    Ok(())
}

// aujourd'hui est accepté, seul le futur est refusé
pub fn validate_birthday(birthday: &NaiveDate) -> Result<(), ValidationError> {
    if *birthday > Local::now().date_naive() {
        return Err(error("birthday", "Incorrect birthday"));
    }
    Ok(())
}

pub fn validate_film_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(error("name", "Empty name"));
    }
    Ok(())
}

pub fn validate_release_date(release_date: &NaiveDate) -> Result<(), ValidationError> {
    if *release_date < *CINEMA_BIRTHDAY {
        return Err(error("release_date", "Incorrect release date"));
    }
    Ok(())
}

/// Message du premier champ en erreur (ordre alphabétique des champs, pour rester déterministe)
pub fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|err| err.message.as_ref().map(|message| message.to_string()))
        .unwrap_or_else(|| "Validation failed".to_string())
}
