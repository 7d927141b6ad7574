use crate::services::{alert_registry::Upsert, monitor::Monitor};

pub const HELP_TEXT: &str = "\
Welcome! To set a stock price alert, use:
/setprice SYMBOL RISE_PRICE FALL_PRICE

Change 'SYMBOL' to the stock code, then 'RISE_PRICE' and 'FALL_PRICE' as your expected price limits.

Example:
/setprice TSLA 650 600

To remove a stock price alert, use:
/removeprice SYMBOL

Example:
/removeprice TSLA

When an alert fires, reply with the new price (or 'SYMBOL PRICE' if several alerts are waiting).";

/// Handles one inbound text from `chat_id`.
///
/// Returns the reply to send back, or None when nothing should be sent from here
/// (unexpected free text, or a reply the adjustment handler already answered).
pub async fn handle_text(monitor: &Monitor, chat_id: &str, text: &str) -> Option<String> {
    let text = text.trim();

    if !text.starts_with('/') {
        if let Some(Err(e)) = monitor.handle_reply(chat_id, text).await {
            tracing::info!("reply from {} not applied: {}", chat_id, e);
        }
        return None;
    }

    let parts: Vec<&str> = text.split_whitespace().collect();
    // "/setprice@SomeBot" in group chats
    let command = parts[0].split('@').next().unwrap_or_default();

    match command {
        "/start" | "/help" => Some(HELP_TEXT.to_string()),
        "/setprice" => Some(set_price(monitor, chat_id, &parts).await),
        "/removeprice" => Some(remove_price(monitor, &parts).await),
        _ => Some(format!("Unknown command {command}. Send /help for usage.")),
    }
}

async fn set_price(monitor: &Monitor, chat_id: &str, parts: &[&str]) -> String {
    let [_, symbol, rise, fall] = parts else {
        return "Incorrect command format. The correct format is: /setprice SYMBOL RISE_PRICE FALL_PRICE"
            .to_string();
    };

    let (Ok(target_rise), Ok(target_fall)) = (rise.parse::<f64>(), fall.parse::<f64>()) else {
        return "Prices need to be numbers. Please re-enter valid rise or fall prices.".to_string();
    };
    if !(target_rise > 0.0 && target_fall > 0.0) {
        return "Prices must be positive numbers. Please reset the rise or fall prices.".to_string();
    }

    let sym = symbol.to_uppercase();
    match monitor.set_alert(chat_id, &sym, target_rise, target_fall).await {
        Ok(Upsert::Created(a)) => format!(
            "Started monitoring {}. Rise target: ${}, Fall target: ${}",
            a.symbol, a.target_rise, a.target_fall
        ),
        Ok(Upsert::Updated(a)) => format!(
            "Updated {}. Rise target: ${}, Fall target: ${}",
            a.symbol, a.target_rise, a.target_fall
        ),
        Ok(Upsert::Restarted(a)) => format!(
            "Restarted monitoring {}. Rise target: ${}, Fall target: ${}",
            a.symbol, a.target_rise, a.target_fall
        ),
        Err(e) => {
            tracing::warn!("setprice {} rejected: {}", sym, e);
            capitalize(&e.to_string())
        }
    }
}

async fn remove_price(monitor: &Monitor, parts: &[&str]) -> String {
    let [_, symbol] = parts else {
        return "Invalid command format. Correct format: /removeprice SYMBOL".to_string();
    };

    let sym = symbol.to_uppercase();
    if monitor.remove_alert(&sym).await {
        format!("Stopped monitoring {sym}.")
    } else {
        format!("No active monitoring found for {sym}.")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
