//! Inline-клавиатуры бота.
//!
//! Все callback-данные используют соглашение `prefix:value`, разбор
//! выполняется в обработчике callback-запросов.

use strum::IntoEnumIterator;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::core::config;
use crate::core::types::EventPurpose;
use crate::storage::events::Event;

/// Главное меню.
pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("Мой профиль", "menu:profile")],
        vec![InlineKeyboardButton::callback("Создать мероприятие", "menu:create")],
        vec![InlineKeyboardButton::callback("Посмотреть мероприятия", "menu:events")],
        vec![InlineKeyboardButton::callback("Оценить участников", "menu:rate")],
        vec![InlineKeyboardButton::callback("Правила создания мероприятий", "menu:rules_creation")],
        vec![InlineKeyboardButton::callback("Правила регистрации на мероприятие", "menu:rules_registration")],
        vec![InlineKeyboardButton::callback("Как работает рейтинг", "menu:rating_info")],
    ])
}

/// Выбор города: популярные города по два в ряд плюс "Другой город".
///
/// `prefix` различает потоки, использующие выбор города (анкета, каталог,
/// мастер создания): callback-данные имеют вид `{prefix}:{город}`.
pub fn cities_keyboard(prefix: &str) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    for pair in config::cities::POPULAR.chunks(2) {
        rows.push(
            pair.iter()
                .map(|city| InlineKeyboardButton::callback(*city, format!("{prefix}:{city}")))
                .collect(),
        );
    }

    rows.push(vec![InlineKeyboardButton::callback(
        "Другой город",
        format!("{prefix}:other"),
    )]);

    InlineKeyboardMarkup::new(rows)
}

/// Выбор города с городом профиля первой кнопкой (значение по умолчанию).
pub fn cities_keyboard_with_current(prefix: &str, current_city: &str) -> InlineKeyboardMarkup {
    let mut rows = vec![vec![InlineKeyboardButton::callback(
        format!("Мой город ({current_city})"),
        format!("{prefix}:{current_city}"),
    )]];
    rows.extend(cities_keyboard(prefix).inline_keyboard);

    InlineKeyboardMarkup::new(rows)
}

/// Выбор пола.
pub fn gender_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("Мужской", "gender:male")],
        vec![InlineKeyboardButton::callback("Женский", "gender:female")],
    ])
}

/// Выбор цели мероприятия.
pub fn purpose_keyboard() -> InlineKeyboardMarkup {
    let rows = EventPurpose::iter()
        .map(|purpose| {
            vec![InlineKeyboardButton::callback(
                purpose.display_name(),
                format!("purpose:{}", purpose.as_str()),
            )]
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(rows)
}

/// Выбор целевой аудитории мероприятия.
pub fn audience_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("Только мужчины", "audience:male")],
        vec![InlineKeyboardButton::callback("Только женщины", "audience:female")],
        vec![InlineKeyboardButton::callback("Для всех", "audience:all")],
    ])
}

/// Возрастные ограничения мероприятия.
pub fn age_limits_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("Без ограничений", "agelimit:none")],
        vec![
            InlineKeyboardButton::callback("18+", "agelimit:18plus"),
            InlineKeyboardButton::callback("21+", "agelimit:21plus"),
        ],
        vec![InlineKeyboardButton::callback("Указать свой диапазон", "agelimit:custom")],
    ])
}

/// Подтверждение (правил или создания мероприятия).
pub fn confirmation_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Подтверждаю", "confirm:yes"),
        InlineKeyboardButton::callback("Отмена", "confirm:no"),
    ]])
}

/// Согласие с правилами перед созданием мероприятия.
pub fn rules_agreement_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "Ознакомлен и согласен",
        "rules:agree",
    )]])
}

/// Меню профиля.
pub fn profile_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("Редактировать профиль", "profile:edit")],
        vec![InlineKeyboardButton::callback("Мои мероприятия", "profile:myevents")],
        vec![InlineKeyboardButton::callback("Купить VIP-статус", "profile:vip")],
        vec![InlineKeyboardButton::callback("Пополнить токены", "profile:topup")],
        vec![InlineKeyboardButton::callback("История операций", "profile:history")],
    ])
}

/// Выбор поля профиля для редактирования.
pub fn edit_profile_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("Имя", "editprofile:name")],
        vec![InlineKeyboardButton::callback("Город", "editprofile:city")],
        vec![InlineKeyboardButton::callback("Возраст", "editprofile:age")],
        vec![InlineKeyboardButton::callback("О себе", "editprofile:about")],
    ])
}

/// Суммы пополнения баланса токенов.
pub fn topup_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("500", "topup:500"),
        InlineKeyboardButton::callback("1000", "topup:1000"),
        InlineKeyboardButton::callback("2000", "topup:2000"),
    ]])
}

/// Кнопка регистрации или отмены под карточкой мероприятия.
pub fn event_actions_keyboard(event_id: i64, is_registered: bool) -> InlineKeyboardMarkup {
    let button = if is_registered {
        InlineKeyboardButton::callback("Отменить запись", format!("unregister:{event_id}"))
    } else {
        InlineKeyboardButton::callback("Записаться", format!("register:{event_id}"))
    };
    InlineKeyboardMarkup::new(vec![vec![button]])
}

/// Список прошедших мероприятий для выставления оценок.
pub fn rating_events_keyboard(events: &[Event]) -> InlineKeyboardMarkup {
    let rows = events
        .iter()
        .map(|event| {
            let label = format!("{} ({})", event.title, event.event_date.format("%d.%m.%Y"));
            vec![InlineKeyboardButton::callback(label, format!("rateevent:{}", event.id))]
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(rows)
}

/// Ряд из пяти звезд для оценки участника.
pub fn stars_keyboard(event_id: i64, rated_id: i64) -> InlineKeyboardMarkup {
    let row = (1..=5u8)
        .map(|score| {
            InlineKeyboardButton::callback(
                "⭐".repeat(score as usize),
                format!("ratestars:{event_id}:{rated_id}:{score}"),
            )
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(vec![row])
}
