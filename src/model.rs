use chrono::{Local, TimeZone, Utc};
use rand::{distributions::Alphanumeric, Rng};
use ratatui::style::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type NoteId = String;

pub const TITLE_MAX_CHARS: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_color",
        deserialize_with = "deserialize_color"
    )]
    pub color_tag_value: Option<ColorTag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTag {
    SkyBlue,
    MintGreen,
    SunshineYellow,
    CoralOrange,
    RoseRed,
    LavenderPurple,
}

/// Validated output of the editing form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub color: Option<ColorTag>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum NoteError {
    #[error("note not found: {0}")]
    NotFound(String),
    #[error("title is required")]
    TitleRequired,
    #[error("title is too long ({0} characters, max {max})", max = TITLE_MAX_CHARS)]
    TitleTooLong(usize),
    #[error("unknown color tag: {0}")]
    UnknownColor(String),
}

impl ColorTag {
    pub const ALL: [ColorTag; 6] = [
        ColorTag::SkyBlue,
        ColorTag::MintGreen,
        ColorTag::SunshineYellow,
        ColorTag::CoralOrange,
        ColorTag::RoseRed,
        ColorTag::LavenderPurple,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            ColorTag::SkyBlue => "sky-blue",
            ColorTag::MintGreen => "mint-green",
            ColorTag::SunshineYellow => "sunshine-yellow",
            ColorTag::CoralOrange => "coral-orange",
            ColorTag::RoseRed => "rose-red",
            ColorTag::LavenderPurple => "lavender-purple",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorTag::SkyBlue => "Sky Blue",
            ColorTag::MintGreen => "Mint Green",
            ColorTag::SunshineYellow => "Sunshine Yellow",
            ColorTag::CoralOrange => "Coral Orange",
            ColorTag::RoseRed => "Rose Red",
            ColorTag::LavenderPurple => "Lavender Purple",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            ColorTag::SkyBlue => Color::Rgb(79, 172, 254),
            ColorTag::MintGreen => Color::Rgb(102, 221, 170),
            ColorTag::SunshineYellow => Color::Rgb(255, 213, 79),
            ColorTag::CoralOrange => Color::Rgb(255, 183, 77),
            ColorTag::RoseRed => Color::Rgb(229, 115, 115),
            ColorTag::LavenderPurple => Color::Rgb(186, 104, 200),
        }
    }

    /// Parses a palette value. Empty input and `no-color` mean the default tag.
    pub fn parse(raw: &str) -> Result<Option<ColorTag>, NoteError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "no-color" {
            return Ok(None);
        }
        ColorTag::ALL
            .iter()
            .find(|tag| tag.value() == trimmed)
            .copied()
            .map(Some)
            .ok_or_else(|| NoteError::UnknownColor(trimmed.to_string()))
    }

    /// Steps through the palette with `None` as the first slot.
    pub fn cycle(current: Option<ColorTag>, delta: isize) -> Option<ColorTag> {
        let slots = ColorTag::ALL.len() as isize + 1;
        let idx = match current {
            None => 0,
            Some(tag) => ColorTag::ALL.iter().position(|t| *t == tag).unwrap_or(0) as isize + 1,
        };
        let next = (idx + delta).rem_euclid(slots);
        if next == 0 {
            None
        } else {
            Some(ColorTag::ALL[(next - 1) as usize])
        }
    }
}

pub fn color_label(tag: Option<ColorTag>) -> &'static str {
    tag.map(|t| t.label()).unwrap_or("Default")
}

fn serialize_color<S>(tag: &Option<ColorTag>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match tag {
        Some(tag) => serializer.serialize_str(tag.value()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Option<ColorTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match ColorTag::parse(&value) {
        Ok(tag) => tag,
        Err(err) => {
            tracing::debug!(%err, "treating stored color tag as default");
            None
        }
    }))
}

impl NoteDraft {
    pub fn new(
        title: &str,
        content: impl Into<String>,
        color: Option<ColorTag>,
    ) -> Result<Self, NoteError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(NoteError::TitleRequired);
        }
        let len = title.chars().count();
        if len > TITLE_MAX_CHARS {
            return Err(NoteError::TitleTooLong(len));
        }
        Ok(NoteDraft {
            title: title.to_string(),
            content: content.into(),
            color,
        })
    }
}

impl Note {
    pub fn new(draft: NoteDraft) -> Self {
        let now = now_millis();
        Note {
            id: generate_id(now),
            title: draft.title,
            content: draft.content,
            created_at: now,
            updated_at: now,
            color_tag_value: draft.color,
        }
    }

    pub fn apply(&mut self, draft: NoteDraft) {
        self.title = draft.title;
        self.content = draft.content;
        self.color_tag_value = draft.color;
        self.touch();
    }

    /// Moves `updated_at` forward, strictly past its previous value.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at.saturating_add(1));
    }

    pub fn updated_label(&self) -> String {
        format_millis(self.updated_at)
    }
}

/// Descending `updated_at`, then `created_at`, then id.
pub fn sort_for_display(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id))
    });
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn format_millis(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%d %b %Y").to_string(),
        None => "unknown".to_string(),
    }
}

fn generate_id(now: i64) -> NoteId {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}{}", now, suffix)
}
