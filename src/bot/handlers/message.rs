use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::Command;
use crate::bot::handlers::callback::show_bookings;
use crate::bot::{keyboards, BotState};
use crate::utils::format::{render_schedule, split_message};
use crate::utils::logging::{log_command_error, log_command_start, log_command_success};
use crate::utils::validation::validate_display_name;

const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

const WELCOME_TEXT: &str = "👋 Welcome! This bot books laundry slots in the shared table.\n\
    Set the name that will appear in the table first, for example: /name Ivan";

const COMMANDS_TEXT: &str = "Available commands:\n\
    /table - the booking table as of right now\n\
    /bookings - manage your active bookings\n\
    /name - change your display name\n\
    /help - detailed help";

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: BotState,
) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = user.id.0;
    let chat_id = msg.chat.id.0;

    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Start => {
            log_command_start("start", user_id, chat_id, None);

            if !state.store.user_exists(user_id).await {
                if let Err(e) = state.store.add_user(user_id).await {
                    log_command_error("start", user_id, chat_id, &format!("{e:#}"));
                }
                bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
                return Ok(());
            }

            match state.store.get_name(user_id).await {
                Some(name) => {
                    bot.send_message(
                        msg.chat.id,
                        format!("Hello, {name}!\n\n{COMMANDS_TEXT}"),
                    )
                    .await?;
                }
                None => {
                    bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
                }
            }
        }
        Command::Name { name } => {
            handle_name(&bot, &msg, &name, &state).await?;
        }
        Command::Table => {
            log_command_start("table", user_id, chat_id, None);
            let snapshot = state.service.table(false).await;
            let text = render_schedule(&snapshot);

            let chunks = split_message(&text, TELEGRAM_MESSAGE_LIMIT);
            let last = chunks.len().saturating_sub(1);
            for (i, chunk) in chunks.into_iter().enumerate() {
                let request = bot
                    .send_message(msg.chat.id, chunk)
                    .parse_mode(ParseMode::Html);
                if i == last {
                    request.reply_markup(keyboards::main_menu()).await?;
                } else {
                    request.await?;
                }
            }
        }
        Command::Bookings => {
            log_command_start("bookings", user_id, chat_id, None);
            let placeholder = bot
                .send_message(msg.chat.id, "🔄 Syncing your bookings...")
                .await?;
            show_bookings(&bot, msg.chat.id, placeholder.id, user_id, &state).await?;
        }
    }
    Ok(())
}

async fn handle_name(bot: &Bot, msg: &Message, name: &str, state: &BotState) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = user.id.0;
    let chat_id = msg.chat.id.0;
    log_command_start("name", user_id, chat_id, Some(name));

    if name.trim().is_empty() {
        bot.send_message(
            msg.chat.id,
            "Please put the name after the command, for example: /name Ivan",
        )
        .await?;
        return Ok(());
    }

    let cleaned = match validate_display_name(name) {
        Ok(cleaned) => cleaned,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("❌ {e}")).await?;
            return Ok(());
        }
    };

    // Re-running /name with the current name is a no-op, not a conflict.
    if let Some(current) = state.store.get_name(user_id).await {
        if current.to_lowercase() == cleaned.to_lowercase() {
            bot.send_message(msg.chat.id, "That name is already set for you.")
                .await?;
            return Ok(());
        }
    }

    if state.store.is_name_taken_by_other(&cleaned, user_id).await {
        bot.send_message(
            msg.chat.id,
            "That name is already used by someone else. Pick another one with /name.",
        )
        .await?;
        return Ok(());
    }

    if let Err(e) = state.store.set_name(user_id, &cleaned).await {
        log_command_error("name", user_id, chat_id, &format!("{e:#}"));
        bot.send_message(msg.chat.id, "❌ Could not save the name, try again later.")
            .await?;
        return Ok(());
    }

    log_command_success("name", user_id, chat_id, Some(&cleaned));
    bot.send_message(
        msg.chat.id,
        format!("Nice to meet you, {cleaned}.\n\n{COMMANDS_TEXT}"),
    )
    .await?;
    Ok(())
}
