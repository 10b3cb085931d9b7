use thiserror::Error;

/// Ожидаемые, восстановимые отказы доменных операций.
///
/// Каждый вариант соответствует конкретному отказу регистрации, оценки
/// или покупки VIP и переводится в сообщение пользователю на уровне
/// Telegram-обработчиков. Ни один из них не роняет процесс.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Пользователь или мероприятие не найдены
    #[error("user or event not found")]
    NotFound,

    /// Пара (user, event) уже существует в журнале регистраций
    #[error("already registered for this event")]
    AlreadyRegistered,

    /// Пары (user, event) нет в журнале регистраций
    #[error("not registered for this event")]
    NotRegistered,

    /// Мероприятие заполнено до max_participants
    #[error("event is full")]
    Full,

    /// Создатель не может зарегистрироваться на собственное мероприятие
    #[error("cannot register for own event")]
    OwnEvent,

    /// Возраст вне диапазона [min_age, max_age] мероприятия
    #[error("age outside event limits")]
    IneligibleAge {
        min_age: Option<u32>,
        max_age: Option<u32>,
    },

    /// Пол не подходит под целевую аудиторию мероприятия
    #[error("gender does not match target audience")]
    IneligibleGender,

    /// Оценка вне диапазона 1..=5
    #[error("score {0} outside 1..=5")]
    InvalidScore(u8),

    /// Недостаточно токенов для покупки
    #[error("insufficient tokens: have {have}, need {need}")]
    InsufficientTokens { have: i64, need: i64 },

    /// Отказ хранилища; транзакция откачена, операция не применена
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for DomainError {
    fn from(err: rusqlite::Error) -> Self {
        DomainError::Storage(err.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(err: r2d2::Error) -> Self {
        DomainError::Storage(err.to_string())
    }
}

impl DomainError {
    /// Текст отказа для отправки пользователю.
    ///
    /// Формулировки сохранены из исходных сообщений сервисного слоя.
    pub fn user_message(&self) -> String {
        match self {
            DomainError::NotFound => "Мероприятие или пользователь не найдены.".to_string(),
            DomainError::AlreadyRegistered => "Вы уже зарегистрированы на это мероприятие.".to_string(),
            DomainError::NotRegistered => "Вы не зарегистрированы на это мероприятие.".to_string(),
            DomainError::Full => "Мероприятие уже заполнено.".to_string(),
            DomainError::OwnEvent => "Нельзя зарегистрироваться на собственное мероприятие.".to_string(),
            DomainError::IneligibleAge { min_age, max_age } => match (min_age, max_age) {
                (Some(min), _) => format!("Минимальный возраст для участия: {} лет.", min),
                (None, Some(max)) => format!("Максимальный возраст для участия: {} лет.", max),
                (None, None) => "Ваш возраст не подходит для этого мероприятия.".to_string(),
            },
            DomainError::IneligibleGender => "Мероприятие предназначено для другой аудитории.".to_string(),
            DomainError::InvalidScore(_) => "Оценка должна быть от 1 до 5 звезд.".to_string(),
            DomainError::InsufficientTokens { have, need } => format!(
                "Недостаточно токенов.\nНеобходимо: {} токенов, у вас: {} токенов.\nПополните баланс и повторите попытку.",
                need, have
            ),
            DomainError::Storage(_) => "Произошла ошибка. Попробуйте позже.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ineligible_age_message_prefers_min_bound() {
        let err = DomainError::IneligibleAge {
            min_age: Some(18),
            max_age: Some(30),
        };
        assert_eq!(err.user_message(), "Минимальный возраст для участия: 18 лет.");

        let err = DomainError::IneligibleAge {
            min_age: None,
            max_age: Some(30),
        };
        assert_eq!(err.user_message(), "Максимальный возраст для участия: 30 лет.");
    }

    #[test]
    fn test_storage_error_from_rusqlite() {
        let err = DomainError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
