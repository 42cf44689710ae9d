use async_trait::async_trait;
use teloxide::{prelude::*, types::ParseMode};

use super::{Alert, AlertSink};

pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat_id: i64) -> Self {
        Self {
            bot,
            chat_id: ChatId(chat_id),
        }
    }

    async fn deliver(&self, text: String) -> bool {
        match self
            .bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .await
        {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(target: "telegram", error = %err, "message delivery failed");
                false
            }
        }
    }
}

#[async_trait]
impl AlertSink for TelegramNotifier {
    async fn send_alert(&self, alert: &Alert) -> bool {
        self.deliver(render_alert(alert)).await
    }

    async fn send_text(&self, text: &str) -> bool {
        self.deliver(text.to_string()).await
    }
}

fn render_alert(alert: &Alert) -> String {
    format!(
        "🚨 <b>{}</b>\n\n<b>{}</b>\n🛰 {}\n🕒 {} min old\n📊 Score {}\n\n{}",
        escape_html(&alert.bucket),
        escape_html(&alert.title),
        escape_html(&alert.source_label),
        alert.age_minutes,
        alert.score,
        alert.url
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_renders_all_five_fields_and_the_link() {
        let alert = Alert {
            bucket: "CYBER".to_string(),
            title: "SOC Analyst <night shift>".to_string(),
            url: "https://jobs.example.co.uk/soc-analyst-1".to_string(),
            source_label: "Indeed RSS".to_string(),
            age_minutes: 12,
            score: 6,
        };
        let rendered = render_alert(&alert);

        assert!(rendered.contains("<b>CYBER</b>"));
        assert!(rendered.contains("SOC Analyst &lt;night shift&gt;"));
        assert!(rendered.contains("🛰 Indeed RSS"));
        assert!(rendered.contains("🕒 12 min old"));
        assert!(rendered.contains("📊 Score 6"));
        assert!(rendered.ends_with("https://jobs.example.co.uk/soc-analyst-1"));
    }

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(escape_html("a<b&\"c'"), "a&lt;b&amp;&quot;c&#39;");
    }
}
