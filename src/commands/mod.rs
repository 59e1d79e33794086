use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "✨ Доступные команды:")]
pub enum Command {
    #[command(description = "🎉 Запустить бота")]
    Start,
    #[command(description = "📘 Каталог молний (PDF)")]
    Catalog,
    #[command(description = "🛒 Оформить заказ")]
    Order,
}

impl Command {
    /// Parses the leading command word only, so `/start payload` still counts as `/start`.
    pub fn from_text(text: &str, bot_username: &str) -> Option<Self> {
        let head = text.split_whitespace().next()?;
        if !head.starts_with('/') {
            return None;
        }
        Self::parse(head, bot_username).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_variants() {
        assert_eq!(Command::from_text("/start", "ykk_bot"), Some(Command::Start));
        assert_eq!(Command::from_text("/start@ykk_bot", "ykk_bot"), Some(Command::Start));
        assert_eq!(Command::from_text("/start promo42", "ykk_bot"), Some(Command::Start));
    }

    #[test]
    fn test_foreign_mention_and_plain_text() {
        assert_eq!(Command::from_text("/start@other_bot", "ykk_bot"), None);
        assert_eq!(Command::from_text("start", "ykk_bot"), None);
        assert_eq!(Command::from_text("/unknown", "ykk_bot"), None);
        assert_eq!(Command::from_text("   ", "ykk_bot"), None);
    }
}
