use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, ParseMode};
use teloxide::{ApiError, RequestError};
use tracing::warn;

use crate::bot::{keyboards, BotState};
use crate::grid::{Day, TimeBand};
use crate::utils::datetime::upcoming_date_for_day;
use crate::utils::format::{describe_slot, escape_html, render_schedule};
use crate::utils::validation::validate_booking_date;

pub async fn callback_handler(bot: Bot, q: CallbackQuery, state: BotState) -> ResponseResult<()> {
    let user_id = q.from.id.0;

    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let Some(message) = q.message.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let chat_id = message.chat.id;
    let message_id = message.id;

    tracing::info!("callback '{}' from user {} in chat {}", data, user_id, chat_id);

    match data.as_str() {
        "refresh" => {
            let snapshot = state.service.table(true).await;
            let text = render_schedule(&snapshot);
            match bot
                .edit_message_text(chat_id, message_id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::main_menu())
                .await
            {
                Ok(_) => {
                    bot.answer_callback_query(q.id).text("✅ Updated").await?;
                }
                Err(RequestError::Api(ApiError::MessageNotModified)) => {
                    bot.answer_callback_query(q.id)
                        .text("✅ Already up to date")
                        .await?;
                }
                Err(e) => return Err(e),
            }
        }
        "menu" => {
            let snapshot = state.service.table(false).await;
            bot.edit_message_text(chat_id, message_id, render_schedule(&snapshot))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::main_menu())
                .await?;
            bot.answer_callback_query(q.id).await?;
        }
        "book" | "back:days" => {
            bot.edit_message_text(chat_id, message_id, "📅 Pick a day:")
                .reply_markup(keyboards::days())
                .await?;
            bot.answer_callback_query(q.id).await?;
        }
        "cancel" => {
            bot.edit_message_text(chat_id, message_id, "❌ Cancelled.")
                .reply_markup(keyboards::main_menu())
                .await?;
            bot.answer_callback_query(q.id).text("Cancelled").await?;
        }
        "noop" => {
            bot.answer_callback_query(q.id)
                .text("That time is already taken for this date")
                .await?;
        }
        "bookings" => {
            bot.answer_callback_query(q.id).text("🔄 Syncing...").await?;
            show_bookings(&bot, chat_id, message_id, user_id, &state).await?;
        }
        other if other.starts_with("day:") => {
            handle_day(&bot, &q.id, chat_id, message_id, other, &state).await?;
        }
        other if other.starts_with("time:") => {
            handle_time(&bot, &q.id, chat_id, message_id, user_id, other, &state).await?;
        }
        other if other.starts_with("manage:") => {
            let cell = other.trim_start_matches("manage:");
            if state.store.owner_of(cell).await != Some(user_id) {
                bot.answer_callback_query(q.id)
                    .text("❌ This booking is stale or not yours")
                    .show_alert(true)
                    .await?;
                show_bookings(&bot, chat_id, message_id, user_id, &state).await?;
                return Ok(());
            }
            bot.edit_message_text(
                chat_id,
                message_id,
                format!(
                    "🗑 <b>Delete booking</b>\n\nReally cancel your booking for\n📍 <b>{}</b>?",
                    describe_slot(cell)
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::delete_confirm(cell))
            .await?;
            bot.answer_callback_query(q.id).await?;
        }
        other if other.starts_with("del:") => {
            let cell = other.trim_start_matches("del:");
            bot.edit_message_text(chat_id, message_id, "⏳ Deleting...")
                .await?;

            match state.service.delete_booking(cell, user_id).await {
                Ok(()) => {
                    bot.answer_callback_query(q.id).text("✅ Deleted").await?;
                    show_bookings(&bot, chat_id, message_id, user_id, &state).await?;
                }
                Err(e) => {
                    bot.answer_callback_query(q.id).await?;
                    bot.edit_message_text(chat_id, message_id, format!("❌ Could not delete: {e}"))
                        .reply_markup(keyboards::main_menu())
                        .await?;
                }
            }
        }
        _ => {
            bot.answer_callback_query(q.id).text("Unknown action").await?;
        }
    }

    Ok(())
}

async fn handle_day(
    bot: &Bot,
    query_id: &str,
    chat_id: ChatId,
    message_id: MessageId,
    data: &str,
    state: &BotState,
) -> ResponseResult<()> {
    let Some(day) = Day::from_label(data.trim_start_matches("day:")) else {
        bot.answer_callback_query(query_id.to_string())
            .text("❌ Unknown day")
            .await?;
        return Ok(());
    };

    // The target date is fixed here and carried through the callback
    // data, so a keyboard left open across midnight still books the date
    // the user saw.
    let target_date = upcoming_date_for_day(day);
    let free = state.service.free_bands_for_day(day, &target_date).await;

    bot.edit_message_text(
        chat_id,
        message_id,
        format!(
            "📅 Day: <b>{}</b>\n📆 Date: <b>{}</b>\n\nPick a free time:",
            day.full_name(),
            target_date
        ),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboards::times(day, &target_date, &free))
    .await?;
    bot.answer_callback_query(query_id.to_string()).await?;
    Ok(())
}

async fn handle_time(
    bot: &Bot,
    query_id: &str,
    chat_id: ChatId,
    message_id: MessageId,
    user_id: u64,
    data: &str,
    state: &BotState,
) -> ResponseResult<()> {
    // Format: time:<day>:<row>:<dd.mm>
    let parts: Vec<&str> = data.splitn(4, ':').collect();
    let slot = match parts.as_slice() {
        ["time", day, row, date] => Day::from_label(day)
            .zip(row.parse().ok().and_then(TimeBand::from_row))
            .map(|(day, band)| (day, band, *date)),
        _ => None,
    };
    let Some((day, band, target_date)) = slot else {
        bot.answer_callback_query(query_id.to_string())
            .text("❌ Malformed slot data")
            .await?;
        return Ok(());
    };

    // The date token came back from the client, not from our keyboard
    // state, so it gets the same validation as typed input.
    let target_date = match validate_booking_date(target_date) {
        Ok(date) => date,
        Err(_) => {
            bot.answer_callback_query(query_id.to_string())
                .text("❌ Malformed slot data")
                .await?;
            return Ok(());
        }
    };

    let Some(name) = state.store.get_name(user_id).await else {
        bot.answer_callback_query(query_id.to_string())
            .text("❌ You have no display name set. Use /name first.")
            .show_alert(true)
            .await?;
        return Ok(());
    };

    bot.edit_message_text(
        chat_id,
        message_id,
        format!(
            "⏳ Booking...\n👤 <b>{}</b>\n📅 {} {}\n⏰ {}",
            escape_html(&name),
            day.full_name(),
            target_date,
            band.label()
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    match state.service.book_slot(user_id, day, band, &target_date).await {
        Ok(()) => {
            bot.edit_message_text(
                chat_id,
                message_id,
                format!(
                    "✅ <b>Booked!</b>\n\n👤 <b>{}</b>\n📅 {} ({})\n⏰ {}\n\n\
                     <i>Hit Refresh to see yourself in the table.</i>",
                    escape_html(&name),
                    day.full_name(),
                    target_date,
                    band.label()
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::main_menu())
            .await?;
        }
        Err(e) => {
            bot.edit_message_text(
                chat_id,
                message_id,
                format!("❌ <b>Could not book:</b>\n{}\n\nTry another time.", escape_html(&e.to_string())),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::main_menu())
            .await?;
        }
    }
    bot.answer_callback_query(query_id.to_string()).await?;
    Ok(())
}

/// Force-refreshes the table, reconciles the user's local bookings
/// against it, and renders the surviving ones into the given message.
/// Used by the /bookings command and several callbacks.
pub async fn show_bookings(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    user_id: u64,
    state: &BotState,
) -> ResponseResult<()> {
    let bookings = match state.service.reconcile_user(user_id).await {
        Ok(bookings) => bookings,
        Err(e) => {
            warn!("failed to reconcile bookings of user {user_id}: {e:#}");
            bot.edit_message_text(chat_id, message_id, "❌ Could not load your bookings, try later.")
                .reply_markup(keyboards::main_menu())
                .await?;
            return Ok(());
        }
    };

    if bookings.is_empty() {
        bot.edit_message_text(
            chat_id,
            message_id,
            "📂 <b>You have no active bookings.</b>\nUse /table or the Book button.",
        )
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await?;
        return Ok(());
    }

    let mut sorted: Vec<(String, String)> = bookings.into_iter().collect();
    sorted.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    bot.edit_message_text(
        chat_id,
        message_id,
        "📋 <b>Your active bookings:</b>\n<i>Tap one to manage it</i>",
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboards::bookings_list(&sorted))
    .await?;
    Ok(())
}
