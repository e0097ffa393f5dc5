//! HTML message bodies (Telegram `ParseMode::Html`).

use teloxide::utils::html::escape;

use crate::apod::DailyImage;
use crate::catalog::CatalogEntry;
use crate::news::{Article, FeedStatus, NewsFeed};
use crate::quiz::QuizSession;
use crate::theme::ThemeColors;

/// Telegram rejects photo captions longer than this.
pub const CAPTION_LIMIT: usize = 1024;

pub fn heading(colors: ThemeColors, title: &str) -> String {
    format!("{} <b>{}</b>", colors.primary, escape(title))
}

pub fn placeholders(slots: usize) -> String {
    let mut text = String::from("<i>Loading articles…</i>\n");
    for _ in 0..slots {
        text.push_str("\n▒▒▒▒▒▒▒▒▒▒▒▒\n░░░░░░░░░░░░░░░░░░\n");
    }
    text
}

pub fn article(colors: ThemeColors, article: &Article) -> String {
    let mut text = format!(
        "{} <a href=\"{}\"><b>{}</b></a>\n",
        colors.text,
        escape(&article.url),
        escape(&article.title)
    );
    if !article.summary.is_empty() {
        text.push_str(&format!("{}\n", escape(&shorten(&article.summary, 200))));
    }
    text.push_str(&format!(
        "<i>{} · {}</i>",
        escape(&article.news_site),
        article.published_at.format("%b %e, %Y")
    ));
    text
}

pub fn articles(colors: ThemeColors, title: &str, articles: &[Article]) -> String {
    let mut text = heading(colors, title);
    if articles.is_empty() {
        text.push_str("\n\nNo articles found.");
        return text;
    }
    for a in articles {
        text.push_str("\n\n");
        text.push_str(&article(colors, a));
    }
    text
}

/// Heading for the news view, naming the active filter.
pub fn feed_title(feed: &NewsFeed) -> String {
    match (feed.category(), feed.search_text()) {
        (Some(category), _) => format!("Latest Space News: {}", category.label()),
        (None, Some(search)) => format!("Latest Space News: \"{}\"", search),
        (None, None) => "Latest Space News".to_string(),
    }
}

pub fn feed_failure(feed: &NewsFeed) -> String {
    match feed.status() {
        FeedStatus::Failed(message) => format!("⚠️ {}", escape(message)),
        _ => "⚠️ Something went wrong.".to_string(),
    }
}

pub fn daily_image_caption(colors: ThemeColors, image: &DailyImage) -> String {
    let mut text = format!(
        "{}\n<i>Date: {}</i>",
        heading(colors, &image.title),
        image.date.format("%Y-%m-%d")
    );
    if let Some(copyright) = &image.copyright {
        text.push_str(&format!("\n<i>© {}</i>", escape(copyright.trim())));
    }
    text
}

pub fn daily_image_explanation(image: &DailyImage) -> String {
    escape(&image.explanation)
}

/// Fits the caption limit by trimming the raw text, so markup and entities
/// stay intact.
pub fn catalog_entry(colors: ThemeColors, entry: &CatalogEntry) -> String {
    let name = shorten(&entry.name, 64);
    let fun_fact = shorten(&entry.fun_fact, 256);
    let visible = format!("{} {}\n\n\n{} Fun fact: {}", colors.primary, name, colors.text, fun_fact);
    let description = shorten(
        &entry.description,
        CAPTION_LIMIT.saturating_sub(visible.chars().count()),
    );
    format!(
        "{}\n{}\n\n{} <b>Fun fact:</b> {}",
        heading(colors, &name),
        escape(&description),
        colors.text,
        escape(&fun_fact)
    )
}

pub fn question(colors: ThemeColors, session: &QuizSession) -> Option<String> {
    let question = session.current_question()?;
    Some(format!(
        "Question {} of {} · Score: {}/{}\n\n{}",
        session.current_index() + 1,
        session.total(),
        session.score(),
        session.total(),
        heading(colors, &question.text)
    ))
}

pub fn answer_feedback(session: &QuizSession) -> String {
    let correct = session
        .current_question()
        .and_then(|q| q.correct_answer())
        .unwrap_or_default();
    match session.is_correct() {
        Some(true) => "✅ Correct!".to_string(),
        _ => format!("❌ Not quite. The answer is <b>{}</b>.", escape(correct)),
    }
}

pub fn final_score(colors: ThemeColors, session: &QuizSession) -> String {
    format!(
        "{}\nYou scored {} out of {}\n\n{}",
        heading(colors, "Quiz Complete!"),
        session.score(),
        session.total(),
        session.verdict()
    )
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}
