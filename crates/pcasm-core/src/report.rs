//! Rendering a [`BuildReport`] as a chat message and as a downloadable text file.

use chrono::{DateTime, TimeZone};

use crate::{
    engine::BuildReport,
    formatting::{escape_html, format_price, Currency},
};

const RULER_WIDTH: usize = 50;

pub const SAVED_SUFFIX: &str = "\n\n✅ Конфигурация успешно сохранена!";

pub fn result_html(report: &BuildReport) -> String {
    let mut components = String::new();
    for c in &report.components {
        let name = match &c.url {
            Some(url) => format!(
                "<a href=\"{}\">{}</a>",
                escape_html(url),
                escape_html(&c.name)
            ),
            None => escape_html(&c.name),
        };
        components.push_str(&format!(
            "• {}: {name} - {} / {}\n",
            escape_html(&c.label),
            format_price(c.price_usd, Currency::Usd),
            format_price(c.price_rub, Currency::Rub),
        ));
    }

    format!(
        "🖥️ <b>Собранная конфигурация ПК</b>\n\n\
         💰 Бюджет: ${}\n\
         🎯 Назначение: {}\n\n\
         <b>Комплектующие:</b>\n\
         {components}\n\
         <b>Общая стоимость:</b> {} ({})\n\
         Остаток бюджета: {}",
        report.budget_usd,
        report.goal.display_name(),
        format_price(report.total_rub, Currency::Rub),
        format_price(report.total_usd, Currency::Usd),
        format_price(report.remaining_usd, Currency::Usd),
    )
}

/// `pc_build_<user>_<YYYYmmdd_HHMMSS>.txt`
pub fn saved_file_name<Tz: TimeZone>(user: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("pc_build_{user}_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

/// Plain-text dump of a build.
pub fn saved_file_text<Tz: TimeZone>(report: &BuildReport, user: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let ruler = "=".repeat(RULER_WIDTH);
    let mut lines = vec![
        ruler.clone(),
        format!(
            "КОНФИГУРАЦИЯ ПК ({})",
            report.goal.build_label().to_uppercase()
        ),
        format!("Сгенерировано: {}", at.format("%d.%m.%Y %H:%M")),
        format!("Пользователь: {user}"),
        ruler.clone(),
        String::new(),
    ];

    for c in &report.components {
        lines.push(format!("{}: {}", c.label.to_uppercase(), c.name));
        lines.push(format!(
            "Цена: {} / {}",
            format_price(c.price_usd, Currency::Usd),
            format_price(c.price_rub, Currency::Rub)
        ));
        for (label, value) in &c.details {
            lines.push(format!("{label}: {value}"));
        }
        if let Some(url) = &c.url {
            lines.push(format!("Ссылка: {url}"));
        }
        lines.push(String::new());
    }

    lines.push(ruler.clone());
    lines.push(format!(
        "ОБЩАЯ СТОИМОСТЬ: {} / {}",
        format_price(report.total_usd, Currency::Usd),
        format_price(report.total_rub, Currency::Rub)
    ));
    lines.push(format!(
        "Остаток бюджета: {}",
        format_price(report.remaining_usd, Currency::Usd)
    ));
    lines.push(ruler);

    lines.join("\n")
}
