//! Состояние диалога с пользователем.
//!
//! Каждому чату соответствует не более одного активного состояния мастера
//! (анкета, создание мероприятия, выставление оценок). Хранилище живет в
//! памяти процесса: после перезапуска пользователь начинает шаг заново, а
//! рабочие списки оценок всегда пересчитываются из базы.

use chrono::NaiveDateTime;
use dashmap::DashMap;

use crate::core::types::{EventPurpose, Gender, TargetAudience};

/// Накопитель данных анкеты пользователя.
#[derive(Debug, Clone, Default)]
pub struct ProfileDraft {
    pub city: Option<String>,
    pub display_name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub about: Option<String>,
}

/// Накопитель данных мастера создания мероприятия.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub city: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDateTime>,
    pub purpose: Option<EventPurpose>,
    pub target_audience: Option<TargetAudience>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub max_participants: Option<u32>,
}

/// Текущий шаг диалога.
#[derive(Debug, Clone)]
pub enum DialogState {
    // Анкета нового пользователя
    ProfileAwaitingCity(ProfileDraft),
    ProfileAwaitingName(ProfileDraft),
    ProfileAwaitingAge(ProfileDraft),
    ProfileAwaitingGender(ProfileDraft),
    ProfileAwaitingAbout(ProfileDraft),

    // Редактирование существующего профиля
    EditingName,
    EditingCity,
    EditingAge,
    EditingAbout,

    // Каталог: ввод города вручную ("Другой город")
    BrowseAwaitingCity,

    // Мастер создания мероприятия
    EventAwaitingRules,
    EventAwaitingCity(EventDraft),
    EventAwaitingTitle(EventDraft),
    EventAwaitingDescription(EventDraft),
    EventAwaitingDate(EventDraft),
    EventAwaitingPurpose(EventDraft),
    EventAwaitingAudience(EventDraft),
    EventAwaitingAgeLimits(EventDraft),
    EventAwaitingCustomAgeLimits(EventDraft),
    EventAwaitingMaxParticipants(EventDraft),
    EventAwaitingConfirmation(EventDraft),
}

/// Потокобезопасное хранилище состояний диалогов по chat_id.
#[derive(Debug, Default)]
pub struct SessionStore {
    states: DashMap<i64, DialogState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Текущее состояние чата, если мастер активен.
    pub fn get(&self, chat_id: i64) -> Option<DialogState> {
        self.states.get(&chat_id).map(|entry| entry.value().clone())
    }

    /// Переводит чат в состояние `state`, заменяя предыдущее.
    pub fn set(&self, chat_id: i64, state: DialogState) {
        self.states.insert(chat_id, state);
    }

    /// Завершает активный мастер чата.
    pub fn clear(&self, chat_id: i64) {
        self.states.remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_previous_state() {
        let store = SessionStore::new();
        assert!(store.get(1).is_none());

        store.set(1, DialogState::ProfileAwaitingCity(ProfileDraft::default()));
        store.set(1, DialogState::EditingAge);
        assert!(matches!(store.get(1), Some(DialogState::EditingAge)));

        // Состояния чатов независимы
        assert!(store.get(2).is_none());
    }

    #[test]
    fn test_clear_removes_state() {
        let store = SessionStore::new();
        store.set(7, DialogState::EventAwaitingRules);
        store.clear(7);
        assert!(store.get(7).is_none());

        // Повторная очистка безопасна
        store.clear(7);
    }
}
