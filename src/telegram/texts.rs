//! Статические тексты бота.
//!
//! Формулировки правил и справки сохранены из оригинального контента
//! площадки, включая рекомендательные сроки (6 часов на уведомление об
//! отмене, 12 часов на отмену записи). Эти сроки нигде не проверяются
//! кодом: они остаются договоренностью между участниками.

/// Приветствие нового пользователя перед анкетой.
pub const WELCOME: &str = "Добро пожаловать в Ясами!\n\n\
    Это площадка для организации неформальных встреч: прогулок, знакомств, \
    путешествий, взаимопомощи и вечеринок.\n\n\
    Чтобы начать, заполним небольшую анкету.";

/// Правила создания мероприятий.
pub const CREATION_RULES: &str = "<b>Правила создания мероприятий</b>\n\n\
    <b>1. Общие положения</b>\n\
    - Мероприятия должны быть направлены на общение, совместный досуг и позитивное взаимодействие.\n\
    - Запрещено создавать события с коммерческой выгодой (продажи, реклама услуг), а также мероприятия, нарушающие законы РФ.\n\
    - Все участники должны чувствовать себя комфортно и безопасно.\n\n\
    <b>2. Ограничения по содержанию</b>\n\
    ❌ Нельзя:\n\
    - Употреблять ненормативную лексику в описании.\n\
    - Указывать контакты (телефоны, соцсети) до подтверждения участия.\n\
    - Размещать мероприятия с политической, религиозной или экстремистской повесткой.\n\
    - Публиковать контент 18+ или провокационного характера.\n\n\
    ✅ Можно:\n\
    - Организовывать спортивные, творческие, развлекательные и другие дружеские встречи.\n\
    - Указывать место, время, возрастные ограничения и другую полезную информацию.\n\
    - Просить участников взять с собой что-то необходимое (еду, инвентарь).\n\n\
    <b>3. Ответственность организатора</b>\n\
    - Вы обязуетесь быть на мероприятии в указанное время.\n\
    - Если мероприятие отменяется, необходимо уведомить участников минимум за 6 часов.\n\
    - Несоблюдение правил ведет к снижению рейтинга или блокировке.";

/// Правила регистрации на мероприятия.
pub const REGISTRATION_RULES: &str = "<b>Правила регистрации на мероприятие</b>\n\n\
    <b>1. Условия участия</b>\n\
    - Вы можете зарегистрироваться только на мероприятия, подходящие вам по возрасту и полу (если организатор указал ограничения).\n\
    - Нельзя записываться \"на всякий случай\" – если вы не уверены, что придете, лучше не занимайте место.\n\n\
    <b>2. Поведение на мероприятии</b>\n\
    ❌ Запрещено:\n\
    - Оскорблять, дискриминировать или нарушать личные границы других участников.\n\
    - Приходить в нетрезвом виде или под воздействием запрещенных веществ.\n\
    - Покидать мероприятие без предупреждения, если от вас зависит его проведение.\n\n\
    ✅ Рекомендуется:\n\
    - Быть пунктуальным и уважать время других.\n\
    - Соблюдать договоренности (например, взять с собой то, о чем договорились).\n\
    - После мероприятия оставить честный отзыв об организаторе и участниках.\n\n\
    <b>3. Отмена участия</b>\n\
    - Если вы передумали, отмените запись за 12 часов до начала.\n\
    - Частые отказы в последний момент могут понизить ваш рейтинг.";

/// Описание системы рейтинга.
pub const RATING_INFO: &str = "<b>Как работает рейтинг</b>\n\n\
    Каждый новый пользователь начинает со 100 баллов.\n\
    После мероприятия участники оценивают друг друга по шкале от 1 до 5 звезд:\n\n\
    ⭐ 1 звезда — минус 10 баллов\n\
    ⭐⭐ 2 звезды — минус 5 баллов\n\
    ⭐⭐⭐ 3 звезды — без изменений\n\
    ⭐⭐⭐⭐ 4 звезды — плюс 5 баллов\n\
    ⭐⭐⭐⭐⭐ 5 звезд — плюс 10 баллов\n\n\
    Рейтинг не опускается ниже нуля. Для создания мероприятий нужен \
    рейтинг не ниже порогового значения.";

/// Информация о VIP-статусе.
pub const VIP_INFO: &str = "<b>VIP-статус</b>\n\n\
    Стоимость: 1500 токенов на 30 дней.\n\
    Повторная покупка продлевает действующий статус.\n\n\
    VIP-участники выделяются в списках и получают приоритетную поддержку.";

/// Справка по командам.
pub const HELP: &str = "Я помогаю организовывать неформальные встречи.\n\n\
    /start — начать работу и заполнить анкету\n\
    /profile — мой профиль, рейтинг и токены\n\
    /create — создать мероприятие\n\
    /events — мероприятия моего города\n\
    /rate — оценить участников прошедших мероприятий\n\
    /help — эта справка";

/// Сообщение перед мастером создания мероприятия.
pub const CREATE_INTRO: &str = "Для создания мероприятия вы должны ознакомиться с правилами публикации \
    мероприятий и общения на площадке.";
