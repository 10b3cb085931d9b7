use std::fmt;
use std::str::FromStr;

use strum::EnumIter;

/// Пол пользователя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Название для отображения в профиле
    pub fn display_name(&self) -> &'static str {
        match self {
            Gender::Male => "Мужской",
            Gender::Female => "Женский",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(format!("Unknown gender: {}", s)),
        }
    }
}

/// Цель мероприятия
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum EventPurpose {
    /// Пошли гулять
    Walk,
    /// Давайте знакомиться
    Meet,
    /// Совместные поездки/путешествия
    Travel,
    /// Друзья, мне нужна помощь
    Help,
    /// Пойдем тусить
    Party,
}

impl EventPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventPurpose::Walk => "walk",
            EventPurpose::Meet => "meet",
            EventPurpose::Travel => "travel",
            EventPurpose::Help => "help",
            EventPurpose::Party => "party",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EventPurpose::Walk => "Пошли гулять",
            EventPurpose::Meet => "Давайте знакомиться",
            EventPurpose::Travel => "Совместные поездки",
            EventPurpose::Help => "Нужна помощь",
            EventPurpose::Party => "Пойдем тусить",
        }
    }
}

impl fmt::Display for EventPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walk" => Ok(EventPurpose::Walk),
            "meet" => Ok(EventPurpose::Meet),
            "travel" => Ok(EventPurpose::Travel),
            "help" => Ok(EventPurpose::Help),
            "party" => Ok(EventPurpose::Party),
            _ => Err(format!("Unknown event purpose: {}", s)),
        }
    }
}

/// Целевая аудитория мероприятия
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetAudience {
    /// Только для мужчин
    Male,
    /// Только для женщин
    Female,
    /// Для всех
    #[default]
    All,
}

impl TargetAudience {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetAudience::Male => "male",
            TargetAudience::Female => "female",
            TargetAudience::All => "all",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TargetAudience::Male => "Только для мужчин",
            TargetAudience::Female => "Только для женщин",
            TargetAudience::All => "Для всех",
        }
    }

    /// Проверяет, подходит ли пользователь с данным полом под аудиторию
    pub fn admits(&self, gender: Gender) -> bool {
        match self {
            TargetAudience::All => true,
            TargetAudience::Male => gender == Gender::Male,
            TargetAudience::Female => gender == Gender::Female,
        }
    }
}

impl fmt::Display for TargetAudience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetAudience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(TargetAudience::Male),
            "female" => Ok(TargetAudience::Female),
            "all" => Ok(TargetAudience::All),
            _ => Err(format!("Unknown target audience: {}", s)),
        }
    }
}

/// Тип учетной записи пользователя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UserType {
    #[default]
    Regular,
    Vip,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Regular => "regular",
            UserType::Vip => "vip",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(UserType::Regular),
            "vip" => Ok(UserType::Vip),
            _ => Err(format!("Unknown user type: {}", s)),
        }
    }
}

macro_rules! impl_sql_text_enum {
    ($ty:ty) => {
        // rusqlite FromSql: read enum from DB text column
        impl rusqlite::types::FromSql for $ty {
            fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
                let s = value.as_str()?;
                <$ty>::from_str(s)
                    .map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(std::io::Error::other(e))))
            }
        }

        // rusqlite ToSql: write enum as text to DB
        impl rusqlite::types::ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::Borrowed(
                    rusqlite::types::ValueRef::Text(self.as_str().as_bytes()),
                ))
            }
        }
    };
}

impl_sql_text_enum!(Gender);
impl_sql_text_enum!(EventPurpose);
impl_sql_text_enum!(TargetAudience);
impl_sql_text_enum!(UserType);
