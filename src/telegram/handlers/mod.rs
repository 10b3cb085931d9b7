//! Обработчики обновлений Telegram: команды, callback-кнопки и текстовые
//! шаги активных мастеров.

pub mod events;
pub mod profile;
pub mod ratings;
pub mod schema;
pub mod types;
