//! User-facing text sent by the bot.
//!
//! Everything here returns Telegram HTML; user-provided strings are escaped.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::database::models::Plant;
use crate::error::ServiceError;
use crate::services::invites::InviteGrant;
use crate::services::registry::RemoveOutcome;
use crate::utils::datetime::{format_datetime, hours_until};
use crate::utils::feedback::FeedbackType;
use crate::utils::html::{bold, code, escape_html};

pub const START_TEXT: &str = "🌿 Welcome to Watering Reminder!\n\n\
    Commands:\n\
    /add &lt;name&gt; &lt;days&gt; - add a plant\n\
    /list - show your plants\n\
    /delete &lt;number&gt; - delete a plant by number\n\
    /clearall - delete all your plants\n\
    /share &lt;number&gt; - share a plant with someone\n\
    /shareall - share all your plants\n\
    /join &lt;code&gt; - get access to shared plants\n\
    /removephoto &lt;number&gt; - remove a plant's photo\n\n\
    Tip: send a photo with the caption /add &lt;name&gt; &lt;days&gt; to add a plant with an image!";

pub const ADD_USAGE: &str = "Usage: /add <plant name> <interval in days>";
pub const ADD_EXAMPLE: &str = "Example: /add Ficus 7. You can also send a photo with the caption /add <name> <days>.";
pub const NO_PLANTS: &str = "You have no plants yet. Use /add to add one.";
pub const NOTHING_TO_CLEAR: &str = "You have no plants to delete.";
pub const GENERIC_FAILURE: &str = "Something went wrong, please try again later.";

/// How the photo attached to `/add` was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoStatus {
    None,
    Attached,
    UploadFailed,
}

pub fn plant_added(name: &str, interval_days: i64, photo: PhotoStatus, next: &DateTime<Utc>, tz: Tz) -> String {
    let photo_note = match photo {
        PhotoStatus::None => "",
        PhotoStatus::Attached => " with photo",
        PhotoStatus::UploadFailed => " (photo upload failed)",
    };

    format!(
        "✅ Added {}{} with watering interval {} day(s). Timer started!\n⏰ First reminder: {}",
        bold(name),
        photo_note,
        interval_days,
        escape_html(&format_datetime(next, tz))
    )
}

/// Replaces the "Uploading photo..." notice once the upload settled.
pub fn photo_upload_notice(photo: PhotoStatus) -> (FeedbackType, &'static str) {
    match photo {
        PhotoStatus::Attached => (FeedbackType::Success, "Photo uploaded"),
        PhotoStatus::UploadFailed | PhotoStatus::None => (
            FeedbackType::Warning,
            "Photo upload failed, adding the plant without it",
        ),
    }
}

pub fn plant_list(plants: &[Plant], tz: Tz) -> String {
    if plants.is_empty() {
        return NO_PLANTS.to_string();
    }

    let mut text = String::from("🪴 Your plants:\n");
    for (i, plant) in plants.iter().enumerate() {
        let photo_marker = if plant.image_id.is_some() { " 📷" } else { "" };
        text.push_str(&format!(
            "\n{}. {}{} - every {} day(s)\n    next: {}",
            i + 1,
            bold(&plant.name),
            photo_marker,
            plant.interval_days,
            escape_html(&format_datetime(&plant.next_watering_at(), tz))
        ));
    }
    text
}

pub fn plant_removed(name: &str, outcome: RemoveOutcome) -> String {
    if outcome.plant_deleted {
        format!("🗑️ Deleted {}", bold(name))
    } else {
        format!(
            "🗑️ Removed {} from your list. Other people still take care of it.",
            bold(name)
        )
    }
}

pub fn cleared(count: u64) -> String {
    if count == 0 {
        NOTHING_TO_CLEAR.to_string()
    } else {
        format!("🗑️ Deleted all {} plant(s) and their images.", count)
    }
}

/// Share reply. `plant_name` is `None` for `/shareall`.
pub fn invite_created(plant_name: Option<&str>, grant: &InviteGrant) -> String {
    let header = match plant_name {
        Some(name) => format!("🔗 Code for {}:", bold(name)),
        None => format!("🔗 Code for all your plants ({}):", grant.plant_count),
    };

    format!(
        "{}\n\n{}\n\nSend this code to another user.\nCommand: /join {}\n\nThe code is valid for {} h.",
        header,
        code(&grant.code),
        escape_html(&grant.code),
        hours_until(grant.created_at, grant.expires_at)
    )
}

pub fn joined(added: &[String], skipped: &[String]) -> String {
    let mut text = format!("✅ You joined {} plant(s):\n", added.len());
    text.push_str(&bullet_list(added));

    if !skipped.is_empty() {
        text.push_str("\n\n⏭️ Skipped (you already have access):\n");
        text.push_str(&bullet_list(skipped));
    }

    text.push_str("\n\nYou will now receive watering reminders for them.");
    text
}

pub fn photo_removed(name: &str, removed: bool) -> String {
    if removed {
        format!("🖼️ Removed the photo of {}", bold(name))
    } else {
        format!("{} has no photo", bold(name))
    }
}

/// Chat text for a failed service call. Internal errors get a generic message.
pub fn service_error(error: &ServiceError) -> String {
    if error.is_internal() {
        format!("❌ {}", GENERIC_FAILURE)
    } else {
        format!("❌ {}", escape_html(&error.to_string()))
    }
}

fn bullet_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("• {}", escape_html(name)))
        .collect::<Vec<_>>()
        .join("\n")
}
