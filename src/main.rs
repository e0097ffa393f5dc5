use std::sync::Arc;

use dotenv::dotenv;
use log::debug;
use reqwest::Url;
use space_facts_bot::apod::{DailyImageLoader, LoadState, NasaApodClient};
use space_facts_bot::catalog::{Catalog, Category};
use space_facts_bot::config::Config;
use space_facts_bot::news::{NewsCategory, NewsFeed, NewsQuery, NewsSource, SpaceflightNewsClient};
use space_facts_bot::orrery::{OrreryBook, ORRERY_TITLE};
use space_facts_bot::quiz::{trivia, PendingAdvance, Progress, QuizSession};
use space_facts_bot::theme::{ThemeBook, ThemeKey, ThemeStore};
use space_facts_bot::{http, render, send};
use teloxide::{
    dispatching::{
        dialogue::{ErasedStorage, InMemStorage, Storage},
        UpdateHandler,
    },
    prelude::*,
    types::{
        ChatAction, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, KeyboardButton,
        KeyboardMarkup, ParseMode,
    },
    utils::html::escape,
};

type SpaceDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default)]
enum State {
    #[default]
    Start,
    Menu,
    News {
        feed: NewsFeed,
    },
    Quiz {
        session: QuizSession,
    },
    Theme,
}

/// Everything the handlers need, built once in `main`.
struct App {
    config: Config,
    catalog: Catalog,
    news: SpaceflightNewsClient,
    apod: NasaApodClient,
    apod_loader: tokio::sync::Mutex<DailyImageLoader>,
    themes: ThemeBook,
    orreries: OrreryBook,
}

#[tokio::main]
async fn main() {
    // The variables may just as well come from the real environment
    dotenv().ok();

    pretty_env_logger::init();
    log::info!("Starting space facts bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return;
        }
    };

    let catalog = match &config.catalog_path {
        Some(path) => match Catalog::from_file(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Failed to load catalog from {}: {}", path.display(), e);
                return;
            }
        },
        None => Catalog::solar_system(),
    };
    log::info!(
        "Catalog loaded: {} planets, {} missions",
        catalog.planets().len(),
        catalog.missions().len()
    );

    let client = match http::client() {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to build HTTP client: {}", e);
            return;
        }
    };

    let app = Arc::new(App {
        news: SpaceflightNewsClient::new(client.clone(), config.news_url.clone()),
        apod: NasaApodClient::new(client, config.apod_url.clone(), config.api_key.clone()),
        apod_loader: tokio::sync::Mutex::new(DailyImageLoader::new()),
        themes: ThemeBook::new(),
        orreries: OrreryBook::new(),
        catalog,
        config,
    });

    let storage: Arc<ErasedStorage<State>> = InMemStorage::<State>::new().erase();
    let bot = Bot::from_env();

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![storage, app])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_message()
        .enter_dialogue::<Message, ErasedStorage<State>, State>()
        .branch(dptree::filter(|msg: Message| msg.text() == Some("/start")).endpoint(start))
        .branch(dptree::case![State::Start].endpoint(start))
        .branch(dptree::case![State::Menu].endpoint(menu))
        .branch(dptree::case![State::News { feed }].endpoint(news_feed))
        .branch(dptree::case![State::Quiz { session }].endpoint(space_quiz))
        .branch(dptree::case![State::Theme].endpoint(theme_selector))
}

const PICTURE_OF_THE_DAY: &str = "🌌 Picture of the Day";
const SPACE_NEWS: &str = "📰 Space News";
const PLANETS: &str = "🪐 Planets";
const MISSIONS: &str = "🚀 Space Missions";
const SPACE_QUIZ: &str = "🧠 Space Quiz";
const SOLAR_SYSTEM: &str = "🔭 3D Solar System";
const THEME: &str = "🎨 Theme";

const BACK: &str = "⬅️ Back";
const ALL_NEWS: &str = "All";
const LOAD_MORE: &str = "⬇️ Load More";
const TRY_AGAIN: &str = "🔄 Try Again";
const CLEAR_SEARCH: &str = "✖️ Clear search";
const RESTART_QUIZ: &str = "🔁 Restart";
const NEW_QUIZ: &str = "🎲 New questions";
const DARK_MODE: &str = "🌙 Dark mode";
const LIGHT_MODE: &str = "☀️ Light mode";

fn menu_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(PICTURE_OF_THE_DAY),
            KeyboardButton::new(SPACE_NEWS),
        ],
        vec![KeyboardButton::new(PLANETS), KeyboardButton::new(MISSIONS)],
        vec![
            KeyboardButton::new(SPACE_QUIZ),
            KeyboardButton::new(SOLAR_SYSTEM),
        ],
        vec![KeyboardButton::new(THEME)],
    ])
}

fn news_keyboard(feed: &NewsFeed) -> KeyboardMarkup {
    let mut categories = vec![KeyboardButton::new(ALL_NEWS)];
    categories.extend(
        NewsCategory::ALL
            .iter()
            .map(|c| KeyboardButton::new(c.label())),
    );

    let mut rows = vec![categories];
    if feed.can_load_more() {
        rows.push(vec![KeyboardButton::new(LOAD_MORE)]);
    }
    if feed.retry_query().is_some() {
        rows.push(vec![KeyboardButton::new(TRY_AGAIN)]);
    }
    if feed.search_text().is_some() {
        rows.push(vec![KeyboardButton::new(CLEAR_SEARCH)]);
    }
    rows.push(vec![KeyboardButton::new(BACK)]);
    KeyboardMarkup::new(rows)
}

fn quiz_keyboard(session: &QuizSession) -> KeyboardMarkup {
    let mut rows = session
        .current_question()
        .map(|q| {
            q.options()
                .map(|o| vec![KeyboardButton::new(o)])
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    rows.push(vec![
        KeyboardButton::new(RESTART_QUIZ),
        KeyboardButton::new(BACK),
    ]);
    KeyboardMarkup::new(rows)
}

fn quiz_over_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(RESTART_QUIZ),
        KeyboardButton::new(NEW_QUIZ),
        KeyboardButton::new(BACK),
    ]])
}

fn theme_keyboard(store: &ThemeStore) -> KeyboardMarkup {
    let themes = store
        .available_themes()
        .into_iter()
        .map(|(key, theme)| {
            if key == store.current_theme() {
                KeyboardButton::new(format!("✓ {}", theme.display_name))
            } else {
                KeyboardButton::new(theme.display_name)
            }
        })
        .collect::<Vec<_>>();
    let toggle = if store.is_dark_mode() {
        LIGHT_MODE
    } else {
        DARK_MODE
    };
    KeyboardMarkup::new(vec![
        themes,
        vec![KeyboardButton::new(toggle), KeyboardButton::new(BACK)],
    ])
}

async fn start(bot: Bot, dialogue: SpaceDialogue, msg: Message, app: Arc<App>) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Hi! Discover the wonders of our universe, from the mysteries of distant planets \
         to humanity's greatest space achievements.",
    )
    .await?;
    show_menu(&bot, &dialogue, msg.chat.id, &app).await
}

async fn show_menu(bot: &Bot, dialogue: &SpaceDialogue, chat: ChatId, app: &App) -> HandlerResult {
    let colors = app.themes.colors(chat.0);
    bot.send_message(
        chat,
        format!(
            "{}\nWhat would you like to explore?",
            render::heading(colors, "Space Facts Explorer")
        ),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(menu_keyboard())
    .await?;

    dialogue.update(State::Menu).await?;
    Ok(())
}

async fn menu(bot: Bot, dialogue: SpaceDialogue, msg: Message, app: Arc<App>) -> HandlerResult {
    let chat = msg.chat.id;
    match msg.text() {
        Some(PICTURE_OF_THE_DAY) => send_daily_image(&bot, chat, &app).await,
        Some(SPACE_NEWS) => {
            run_news_query(&bot, &dialogue, chat, &app, NewsFeed::new(), NewsQuery::default()).await
        }
        Some(PLANETS) => send_catalog(&bot, chat, &app, Category::Planet).await,
        Some(MISSIONS) => send_catalog(&bot, chat, &app, Category::Mission).await,
        Some(SPACE_QUIZ) => start_quiz(&bot, &dialogue, chat, &app).await,
        Some(SOLAR_SYSTEM) => send_orrery(&bot, chat, &app).await,
        Some(THEME) => {
            dialogue.update(State::Theme).await?;
            send_theme_panel(&bot, chat, &app).await
        }
        _ => {
            bot.send_message(chat, "Please choose one of the options")
                .reply_markup(menu_keyboard())
                .await?;
            Ok(())
        }
    }
}

async fn send_daily_image(bot: &Bot, chat: ChatId, app: &App) -> HandlerResult {
    // Purely cosmetic, so a failure here is not worth reporting
    let _ = bot.send_chat_action(chat, ChatAction::UploadPhoto).await;

    let state = {
        let mut loader = app.apod_loader.lock().await;
        loader.load(&app.apod).await.clone()
    };

    let image = match state {
        LoadState::Loaded(image) => image,
        LoadState::Failed(message) => {
            bot.send_message(
                chat,
                format!(
                    "⚠️ {}\nTap “{}” to try again.",
                    escape(&message),
                    PICTURE_OF_THE_DAY
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
            return Ok(());
        }
        LoadState::NotLoaded => return Ok(()),
    };

    let colors = app.themes.colors(chat.0);
    let caption = render::daily_image_caption(colors, &image);
    let photo = Url::parse(&image.url)
        .ok()
        .filter(|_| image.is_image())
        .map(|url| {
            bot.send_photo(chat, InputFile::url(url))
                .caption(caption.clone())
                .parse_mode(ParseMode::Html)
                .send()
        });
    let text = bot
        .send_message(chat, format!("{}\n{}", caption, escape(&image.url)))
        .parse_mode(ParseMode::Html)
        .send();
    send::photo_or_text(photo, text).await?;
    bot.send_message(chat, render::daily_image_explanation(&image))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

async fn send_catalog(bot: &Bot, chat: ChatId, app: &App, category: Category) -> HandlerResult {
    let colors = app.themes.colors(chat.0);
    for entry in app.catalog.entries(category) {
        let caption = render::catalog_entry(colors, entry);
        let photo = Url::parse(&entry.image_url).ok().map(|url| {
            bot.send_photo(chat, InputFile::url(url))
                .caption(caption.clone())
                .parse_mode(ParseMode::Html)
                .send()
        });
        let text = bot
            .send_message(chat, caption)
            .parse_mode(ParseMode::Html)
            .send();
        send::photo_or_text(photo, text).await?;
    }
    Ok(())
}

async fn send_orrery(bot: &Bot, chat: ChatId, app: &App) -> HandlerResult {
    let orrery = app.orreries.get(chat.0);
    let link = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        ORRERY_TITLE,
        Url::parse(orrery.url())?,
    )]]);
    let text = "Explore the planets, moons and spacecraft in real time:";

    if orrery.is_loaded() {
        bot.send_message(chat, text).reply_markup(link).await?;
        return Ok(());
    }

    let placeholder = bot
        .send_message(chat, "⏳ Loading the 3D Solar System…")
        .await?;
    bot.edit_message_text(chat, placeholder.id, text)
        .reply_markup(link)
        .await?;

    app.orreries.mark_loaded(chat.0);
    debug!("Orrery loaded for {}", chat.0);
    Ok(())
}

async fn send_theme_panel(bot: &Bot, chat: ChatId, app: &App) -> HandlerResult {
    let store = app.themes.get(chat.0);
    let colors = store.theme_colors();
    let text = format!(
        "{}\nCurrent theme: {} ({} mode)\n{} Headings look like this\n{} Items look like this",
        render::heading(colors, "Theme"),
        store.current_theme().display_name(),
        if store.is_dark_mode() { "dark" } else { "light" },
        colors.primary,
        colors.text,
    );
    bot.send_message(chat, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(theme_keyboard(&store))
        .await?;
    Ok(())
}

async fn theme_selector(
    bot: Bot,
    dialogue: SpaceDialogue,
    msg: Message,
    app: Arc<App>,
) -> HandlerResult {
    let chat = msg.chat.id;
    match msg.text() {
        Some(BACK) => return show_menu(&bot, &dialogue, chat, &app).await,
        Some(DARK_MODE) | Some(LIGHT_MODE) => {
            app.themes.update(chat.0, ThemeStore::toggle_dark_mode);
        }
        Some(text) => match ThemeKey::parse(text.trim_start_matches("✓ ")) {
            Some(key) => {
                app.themes.update(chat.0, |store| store.set_current_theme(key));
            }
            None => {
                bot.send_message(chat, "Please choose one of the themes")
                    .await?;
                return Ok(());
            }
        },
        None => {
            bot.send_message(chat, "Please choose one of the themes")
                .await?;
            return Ok(());
        }
    }
    send_theme_panel(&bot, chat, &app).await
}

async fn news_feed(
    bot: Bot,
    dialogue: SpaceDialogue,
    feed: NewsFeed,
    msg: Message,
    app: Arc<App>,
) -> HandlerResult {
    let chat = msg.chat.id;
    let text = match msg.text() {
        Some(text) => text,
        None => {
            bot.send_message(chat, "Type something to search, or pick a category")
                .reply_markup(news_keyboard(&feed))
                .await?;
            return Ok(());
        }
    };

    let query = match text {
        BACK => return show_menu(&bot, &dialogue, chat, &app).await,
        LOAD_MORE => feed.next_page_query(),
        TRY_AGAIN => feed.retry_query(),
        CLEAR_SEARCH => Some(feed.search_query(None)),
        ALL_NEWS => Some(feed.category_query(None)),
        other => match NewsCategory::from_label(other) {
            Some(category) => Some(feed.category_query(Some(category))),
            // Anything else is a search
            None => Some(feed.search_query(Some(other.to_string()))),
        },
    };

    match query {
        Some(query) => run_news_query(&bot, &dialogue, chat, &app, feed, query).await,
        None => {
            bot.send_message(chat, "Nothing to load right now")
                .reply_markup(news_keyboard(&feed))
                .await?;
            Ok(())
        }
    }
}

async fn run_news_query(
    bot: &Bot,
    dialogue: &SpaceDialogue,
    chat: ChatId,
    app: &App,
    mut feed: NewsFeed,
    query: NewsQuery,
) -> HandlerResult {
    let request = feed.begin(query);
    dialogue.update(State::News { feed: feed.clone() }).await?;

    // The first page gets placeholders; "load more" keeps what is already on screen
    let placeholder = match feed.placeholder_slots() {
        0 => {
            let _ = bot.send_chat_action(chat, ChatAction::Typing).await;
            None
        }
        slots => Some(
            bot.send_message(chat, render::placeholders(slots))
                .parse_mode(ParseMode::Html)
                .await?,
        ),
    };

    let result = app.news.fetch_page(request.query()).await;

    // Re-read the feed: the reader may have asked for something else meanwhile
    let mut feed = match dialogue.get().await? {
        Some(State::News { feed }) => feed,
        _ => return Ok(()),
    };
    let applied = feed.complete(&request, &result);
    if let Some(placeholder) = placeholder {
        let _ = bot.delete_message(chat, placeholder.id).await;
    }
    if !applied {
        return Ok(());
    }
    dialogue.update(State::News { feed: feed.clone() }).await?;

    let colors = app.themes.colors(chat.0);
    let text = match &result {
        Ok(_) if request.query().is_first_page() => {
            render::articles(colors, &render::feed_title(&feed), feed.articles())
        }
        Ok(page) => render::articles(colors, "More Space News", &page.articles),
        Err(_) => render::feed_failure(&feed),
    };
    bot.send_message(chat, text)
        .parse_mode(ParseMode::Html)
        .disable_web_page_preview(true)
        .reply_markup(news_keyboard(&feed))
        .await?;
    Ok(())
}

async fn start_quiz(bot: &Bot, dialogue: &SpaceDialogue, chat: ChatId, app: &App) -> HandlerResult {
    let session = trivia::new_session(&app.catalog, &mut rand::thread_rng());
    if session.is_complete() {
        log::warn!("Catalog too small to build a quiz");
        bot.send_message(chat, "There aren't enough facts for a quiz yet")
            .await?;
        return Ok(());
    }

    dialogue
        .update(State::Quiz {
            session: session.clone(),
        })
        .await?;
    send_question(bot, chat, app, &session).await
}

async fn send_question(bot: &Bot, chat: ChatId, app: &App, session: &QuizSession) -> HandlerResult {
    let colors = app.themes.colors(chat.0);
    if let Some(text) = render::question(colors, session) {
        bot.send_message(chat, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(quiz_keyboard(session))
            .await?;
    }
    Ok(())
}

async fn space_quiz(
    bot: Bot,
    dialogue: SpaceDialogue,
    session: QuizSession,
    msg: Message,
    app: Arc<App>,
) -> HandlerResult {
    let chat = msg.chat.id;
    let mut session = session;

    match msg.text() {
        Some(BACK) => show_menu(&bot, &dialogue, chat, &app).await,
        Some(NEW_QUIZ) => start_quiz(&bot, &dialogue, chat, &app).await,
        Some(RESTART_QUIZ) => {
            session.restart();
            dialogue
                .update(State::Quiz {
                    session: session.clone(),
                })
                .await?;
            send_question(&bot, chat, &app, &session).await
        }
        Some(answer) if session.current_question().is_some_and(|q| q.has_option(answer)) => {
            let pending = match session.submit_answer(answer) {
                Some(pending) => pending,
                // Already answered, the next question is on its way
                None => return Ok(()),
            };
            dialogue
                .update(State::Quiz {
                    session: session.clone(),
                })
                .await?;
            bot.send_message(chat, render::answer_feedback(&session))
                .parse_mode(ParseMode::Html)
                .await?;

            schedule_advance(bot, dialogue, app, pending);
            Ok(())
        }
        _ if session.is_complete() => {
            bot.send_message(chat, "The quiz is over. Play again?")
                .reply_markup(quiz_over_keyboard())
                .await?;
            Ok(())
        }
        _ => {
            bot.send_message(chat, "Please pick one of the options")
                .reply_markup(quiz_keyboard(&session))
                .await?;
            Ok(())
        }
    }
}

fn schedule_advance(bot: Bot, dialogue: SpaceDialogue, app: Arc<App>, pending: PendingAdvance) {
    tokio::spawn(async move {
        tokio::time::sleep(app.config.quiz_advance_delay).await;
        if let Err(e) = advance_quiz(&bot, &dialogue, &app, pending).await {
            log::error!("Failed to advance the quiz in {}: {}", dialogue.chat_id().0, e);
        }
    });
}

async fn advance_quiz(
    bot: &Bot,
    dialogue: &SpaceDialogue,
    app: &App,
    pending: PendingAdvance,
) -> HandlerResult {
    let chat = dialogue.chat_id();
    let mut session = match dialogue.get().await? {
        Some(State::Quiz { session }) => session,
        // Left the quiz in the meantime
        _ => return Ok(()),
    };

    match session.advance(pending) {
        Progress::Stale => {
            debug!("Dropping a stale quiz transition in {}", chat.0);
        }
        Progress::Next(_) => {
            dialogue
                .update(State::Quiz {
                    session: session.clone(),
                })
                .await?;
            send_question(bot, chat, app, &session).await?;
        }
        Progress::Finished { score, total } => {
            log::info!("Quiz finished in {}: {}/{}", chat.0, score, total);
            dialogue
                .update(State::Quiz {
                    session: session.clone(),
                })
                .await?;
            let colors = app.themes.colors(chat.0);
            bot.send_message(chat, render::final_score(colors, &session))
                .parse_mode(ParseMode::Html)
                .reply_markup(quiz_over_keyboard())
                .await?;
        }
    }
    Ok(())
}
