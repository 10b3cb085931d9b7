use once_cell::sync::Lazy;
use std::env;

/// Configuration constants for the bot

/// Telegram bot token, read once at startup from BOT_TOKEN or TELOXIDE_TOKEN
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_default()
});

/// Path to the SQLite database file
/// Read from DATABASE_PATH environment variable, defaults to "yasami.sqlite"
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "yasami.sqlite".to_string()));

/// Rating system configuration
pub mod rating {
    use once_cell::sync::Lazy;
    use std::env;

    /// Начальный рейтинг пользователя
    pub const DEFAULT_RATING: i64 = 100;

    /// Минимальный рейтинг для создания мероприятий
    /// Read from MIN_RATING_TO_CREATE environment variable, defaults to 20
    pub static MIN_RATING_TO_CREATE: Lazy<i64> = Lazy::new(|| {
        env::var("MIN_RATING_TO_CREATE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20)
    });

    /// Минимальный рейтинг для просмотра мероприятий
    /// Read from MIN_RATING_TO_VIEW environment variable, defaults to 0
    pub static MIN_RATING_TO_VIEW: Lazy<i64> = Lazy::new(|| {
        env::var("MIN_RATING_TO_VIEW")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    });

    /// Влияние оценки на рейтинг пользователя.
    ///
    /// Статическая таблица, не выводится из самой оценки: 3 звезды —
    /// сознательный ноль, а не "оценка минус база".
    pub fn impact(score: u8) -> i64 {
        match score {
            1 => -10,
            2 => -5,
            3 => 0,
            4 => 5,
            5 => 10,
            _ => 0,
        }
    }
}

/// VIP status configuration
pub mod vip {
    /// Стоимость VIP-статуса в токенах
    pub const COST_TOKENS: i64 = 1500;

    /// Срок действия VIP-статуса в днях за одну покупку
    pub const DURATION_DAYS: i64 = 30;
}

/// Moderation limits for user-entered content
pub mod moderation {
    /// Максимальная длина названия мероприятия
    pub const MAX_EVENT_TITLE_LENGTH: usize = 100;

    /// Максимальная длина описания мероприятия
    pub const MAX_EVENT_DESCRIPTION_LENGTH: usize = 1000;

    /// Максимальная длина информации "о себе"
    pub const MAX_ABOUT_LENGTH: usize = 500;

    /// Минимум за сколько часов до начала можно создать мероприятие
    pub const MIN_EVENT_ADVANCE_HOURS: i64 = 1;

    /// Минимальный возраст пользователя бота
    pub const MIN_USER_AGE: u32 = 14;

    /// Максимальный принимаемый возраст
    pub const MAX_USER_AGE: u32 = 100;
}

/// Popular cities offered in city-selection keyboards.
/// Free-text entry is still allowed ("Другой город"), so this list is a
/// convenience, not a constraint.
pub mod cities {
    pub const POPULAR: &[&str] = &[
        "Москва",
        "Санкт-Петербург",
        "Новосибирск",
        "Екатеринбург",
        "Казань",
        "Нижний Новгород",
        "Челябинск",
        "Красноярск",
        "Самара",
        "Уфа",
        "Ростов-на-Дону",
        "Краснодар",
        "Омск",
        "Воронеж",
        "Пермь",
        "Волгоград",
        "Саратов",
        "Тюмень",
        "Иркутск",
        "Хабаровск",
        "Ярославль",
        "Владивосток",
        "Томск",
        "Калининград",
        "Тверь",
        "Сочи",
    ];
}

/// Network configuration
pub mod network {
    use std::time::Duration;

    /// Request timeout for Telegram API requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_table() {
        assert_eq!(rating::impact(1), -10);
        assert_eq!(rating::impact(2), -5);
        assert_eq!(rating::impact(3), 0);
        assert_eq!(rating::impact(4), 5);
        assert_eq!(rating::impact(5), 10);
    }

    #[test]
    fn test_impact_out_of_range_is_noop() {
        assert_eq!(rating::impact(0), 0);
        assert_eq!(rating::impact(6), 0);
    }

    #[test]
    fn test_popular_cities_non_empty() {
        assert!(cities::POPULAR.len() >= 16);
        assert!(cities::POPULAR.contains(&"Москва"));
    }
}
