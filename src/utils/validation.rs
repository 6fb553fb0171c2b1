use anyhow::{anyhow, Result};

pub const MAX_PLANT_NAME_LENGTH: usize = 64;
pub const MAX_INTERVAL_DAYS: i64 = 365;

pub fn validate_plant_name(name: &str) -> Result<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(anyhow!("Plant name cannot be empty"));
    }

    if name.chars().count() > MAX_PLANT_NAME_LENGTH {
        return Err(anyhow!(
            "Plant name cannot be longer than {} characters",
            MAX_PLANT_NAME_LENGTH
        ));
    }

    if name.contains('\n') || name.contains('\r') {
        return Err(anyhow!("Plant name cannot contain line breaks"));
    }

    Ok(name.to_string())
}

pub fn validate_interval_days(raw: &str) -> Result<i64> {
    let days: i64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow!("Interval must be a positive number"))?;

    if days <= 0 {
        return Err(anyhow!("Interval must be a positive number"));
    }

    if days > MAX_INTERVAL_DAYS {
        return Err(anyhow!("Interval cannot be longer than {} days", MAX_INTERVAL_DAYS));
    }

    Ok(days)
}

/// Splits `/add` arguments into a plant name and an interval.
///
/// The last whitespace-separated token is the interval; everything before
/// it is the name, so names may contain spaces: `Monstera deliciosa 7`.
pub fn parse_add_args(args: &str) -> Result<(String, i64)> {
    let tokens: Vec<&str> = args.split_whitespace().collect();

    let Some((interval, name_tokens)) = tokens.split_last() else {
        return Err(anyhow!("Missing plant name and interval"));
    };

    if name_tokens.is_empty() {
        return Err(anyhow!("Missing plant name or interval"));
    }

    let days = validate_interval_days(interval)?;
    let name = validate_plant_name(&name_tokens.join(" "))?;

    Ok((name, days))
}

/// Extracts `/add` arguments from a photo caption, if the caption is an add command.
///
/// Accepts `/add` and the `/add@BotName` form Telegram uses in groups.
pub fn add_command_args(caption: &str) -> Option<&str> {
    let caption = caption.trim_start();
    let (command, rest) = match caption.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest),
        None => (caption, ""),
    };

    let command = command.split('@').next().unwrap_or(command);
    if command.eq_ignore_ascii_case("/add") {
        Some(rest.trim())
    } else {
        None
    }
}

/// Turns a 1-based plant number from the user into an index into their list.
pub fn parse_plant_number(raw: &str, plant_count: usize) -> Result<usize> {
    let number: usize = raw
        .trim()
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| anyhow!("Plant number must be a positive number"))?;

    if plant_count == 0 {
        return Err(anyhow!("You have no plants yet"));
    }

    if number > plant_count {
        return Err(anyhow!("You only have {} plants", plant_count));
    }

    Ok(number - 1)
}

pub fn validate_invite_code_input(raw: &str) -> Result<String> {
    let code = raw.trim();

    if code.is_empty() {
        return Err(anyhow!("Invite code cannot be empty"));
    }

    if code.chars().count() > 32 || code.chars().any(char::is_whitespace) {
        return Err(anyhow!("That doesn't look like an invite code"));
    }

    Ok(code.to_string())
}

pub fn validate_telegram_chat_id(chat_id: i64) -> Result<()> {
    if chat_id == 0 {
        return Err(anyhow!("Chat ID cannot be zero"));
    }

    // Supergroup ids start around -1000000000000
    if chat_id < -2000000000000 {
        return Err(anyhow!("Chat ID out of valid range"));
    }

    Ok(())
}
