//! Validation of free-text wizard input
//!
//! Every wizard step that accepts typed text goes through one of these
//! validators before anything reaches storage. Each returns either the
//! parsed value or a user-facing message in Russian, matching the tone of
//! the surrounding bot copy.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::core::config::moderation;

/// Validation failure with a message ready to send back to the user
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Валидация введенного возраста.
pub fn validate_age(age_str: &str) -> Result<u32, ValidationError> {
    let age: u32 = age_str
        .trim()
        .parse()
        .map_err(|_| ValidationError("Пожалуйста, введите корректный возраст (число).".to_string()))?;

    if age < moderation::MIN_USER_AGE {
        return Err(ValidationError(format!(
            "Минимальный возраст для пользователей бота - {} лет.",
            moderation::MIN_USER_AGE
        )));
    }

    if age > moderation::MAX_USER_AGE {
        return Err(ValidationError(format!(
            "Пожалуйста, введите реальный возраст (не более {} лет).",
            moderation::MAX_USER_AGE
        )));
    }

    Ok(age)
}

/// Валидация даты и времени мероприятия в формате ДД.ММ.ГГГГ ЧЧ:ММ.
///
/// Дата должна быть в будущем относительно `now` (с запасом
/// `MIN_EVENT_ADVANCE_HOURS`).
pub fn validate_event_datetime(datetime_str: &str, now: NaiveDateTime) -> Result<NaiveDateTime, ValidationError> {
    let parsed = NaiveDateTime::parse_from_str(datetime_str.trim(), "%d.%m.%Y %H:%M").map_err(|_| {
        ValidationError(
            "Неверный формат даты и времени. Пожалуйста, укажите в формате ДД.ММ.ГГГГ ЧЧ:ММ, \
             например: 15.06.2025 18:00"
                .to_string(),
        )
    })?;

    let min_start = now + chrono::Duration::hours(moderation::MIN_EVENT_ADVANCE_HOURS);
    if parsed < min_start {
        return Err(ValidationError(
            "Нельзя создать мероприятие в прошлом. Пожалуйста, укажите дату и время в будущем \
             (минимум за час до начала)."
                .to_string(),
        ));
    }

    Ok(parsed)
}

/// Валидация и нормализация названия города.
pub fn validate_city(city: &str) -> Result<String, ValidationError> {
    let normalized: String = city.split_whitespace().collect::<Vec<_>>().join(" ");

    if normalized.chars().count() < 2 {
        return Err(ValidationError(
            "Название города слишком короткое. Пожалуйста, введите корректное название.".to_string(),
        ));
    }

    Ok(normalized)
}

/// Валидация отображаемого имени пользователя.
pub fn validate_display_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim().to_string();

    if name.chars().count() < 2 {
        return Err(ValidationError(
            "Имя слишком короткое. Пожалуйста, введите более длинное имя.".to_string(),
        ));
    }

    Ok(name)
}

/// Валидация названия мероприятия.
pub fn validate_event_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim().to_string();

    if title.is_empty() {
        return Err(ValidationError("Название не может быть пустым.".to_string()));
    }

    if title.chars().count() > moderation::MAX_EVENT_TITLE_LENGTH {
        return Err(ValidationError(format!(
            "Название слишком длинное (максимум {} символов).",
            moderation::MAX_EVENT_TITLE_LENGTH
        )));
    }

    Ok(title)
}

/// Валидация описания мероприятия.
pub fn validate_event_description(description: &str) -> Result<String, ValidationError> {
    let description = description.trim().to_string();

    if description.is_empty() {
        return Err(ValidationError("Описание не может быть пустым.".to_string()));
    }

    if description.chars().count() > moderation::MAX_EVENT_DESCRIPTION_LENGTH {
        return Err(ValidationError(format!(
            "Описание слишком длинное (максимум {} символов).",
            moderation::MAX_EVENT_DESCRIPTION_LENGTH
        )));
    }

    Ok(description)
}

/// Валидация текста "о себе". Пустая строка допустима.
pub fn validate_about(about: &str) -> Result<Option<String>, ValidationError> {
    let about = about.trim();

    if about.is_empty() || about == "-" {
        return Ok(None);
    }

    if about.chars().count() > moderation::MAX_ABOUT_LENGTH {
        return Err(ValidationError(format!(
            "Текст слишком длинный (максимум {} символов).",
            moderation::MAX_ABOUT_LENGTH
        )));
    }

    Ok(Some(about.to_string()))
}

/// Валидация максимального количества участников. "0" означает без лимита.
pub fn validate_max_participants(value: &str) -> Result<Option<u32>, ValidationError> {
    let n: u32 = value
        .trim()
        .parse()
        .map_err(|_| ValidationError("Пожалуйста, введите число (0 — без ограничения).".to_string()))?;

    if n == 0 {
        return Ok(None);
    }

    if n < 2 {
        return Err(ValidationError(
            "Минимальное количество участников мероприятия — 2.".to_string(),
        ));
    }

    Ok(Some(n))
}
