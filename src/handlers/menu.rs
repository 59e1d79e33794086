//! Keyboard and user-facing texts of the shop bot.

use teloxide::types::{KeyboardButton, KeyboardMarkup};

use crate::models::OrderTicket;

pub const CATALOG_BUTTON: &str = "📘 Каталог";
pub const ORDER_BUTTON: &str = "🛒 Сделать заказ";

pub const CATALOG_TEXT: &str =
    "📎 Наш каталог YKK (PDF):\n[Скачать каталог](https://disk.yandex.ru/i/ytpOf5X_TUNBBw)";
pub const ORDER_PROMPT: &str = "🧵 Введите детали заказа (например: тип молнии, длина, количество):";
pub const ORDER_EMPTY: &str = "Пожалуйста, введите детали заказа.";
pub const PHONE_PROMPT: &str = "📞 Укажите номер телефона для связи:";
pub const PHONE_INVALID: &str =
    "❗️ Номер телефона должен содержать не менее 5 символов.\nПожалуйста, введите номер ещё раз:";
pub const ORDER_CONFIRMED: &str =
    "✅ Спасибо! Ваш заказ принят.\nМенеджер свяжется с вами в ближайшее время.";
pub const ORDER_LOST: &str = "⚠️ Не удалось найти ваш заказ — возможно, истекло время ожидания.\n\
    Пожалуйста, оформите заказ заново: «🛒 Сделать заказ».";
pub const SERVICE_ERROR: &str = "⚠️ Произошла временная ошибка.\n\
    Пожалуйста, начните оформление заказа заново: «🛒 Сделать заказ».";
pub const USE_MENU: &str = "Пожалуйста, воспользуйтесь меню ниже 👇";

pub const HEALTH_TEXT: &str = "✅ YKK Shop Bot работает стабильно 24/7!";

/// Minimum phone length, in characters.
pub const MIN_PHONE_LEN: usize = 5;

pub fn main_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(CATALOG_BUTTON),
        KeyboardButton::new(ORDER_BUTTON),
    ]])
    .resize_keyboard()
}

/// Salutation for a wall-clock hour (0..=23).
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Доброе утро 🌅",
        12..=16 => "Добрый день ☀️",
        17..=22 => "Добрый вечер 🌇",
        _ => "Доброй ночи 🌙",
    }
}

pub fn welcome_text(hour: u32, first_name: &str) -> String {
    format!(
        "{}, *{}!* 👋\n\n\
        Добро пожаловать в *YKK Shop* — бот легендарной *YKK* 🇯🇵\n\n\
        🔹 Здесь вы можете:\n\
        — Посмотреть каталог молний (PDF)\n\
        — Оформить оптовый заказ\n\n\
        Jamme — заряжай мечты ⚡️",
        greeting(hour),
        escape_markdown(first_name)
    )
}

pub fn admin_notification(ticket: &OrderTicket) -> String {
    let username = match &ticket.username {
        Some(name) => format!("@{}", escape_markdown(name)),
        None => "@Без username".to_string(),
    };
    format!(
        "📦 *Новый заказ!*\n\n\
        👤 От: {}\n\
        🧾 Имя: {}\n\
        💬 Заказ: {}\n\
        📞 Телефон: {}",
        username,
        escape_markdown(&ticket.first_name),
        escape_markdown(&ticket.order),
        escape_markdown(&ticket.phone)
    )
}

/// Escapes the entity characters of legacy Markdown so user text cannot break parsing.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone.trim().chars().count() >= MIN_PHONE_LEN
}
