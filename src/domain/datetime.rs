// src/domain/datetime.rs

use chrono::NaiveDateTime;

/// Format produced by a `datetime-local` input and used on the wire for
/// `scheduledAt` / `recallAt`.
pub const LOCAL_MINUTES: &str = "%Y-%m-%dT%H:%M";

/// Parses a local date-time as typed into the call-mode form.
/// Accepts minute or second precision, with `T` or a space separator.
pub fn parse_local(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

pub fn format_local(dt: &NaiveDateTime) -> String {
    dt.format(LOCAL_MINUTES).to_string()
}

/// serde adapter for `Option<NaiveDateTime>` in `YYYY-MM-DDTHH:MM` form.
/// Empty strings and unparseable values read as `None`.
pub mod local_minutes {
    use super::{format_local, parse_local};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => s.serialize_str(&format_local(dt)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.as_deref().and_then(parse_local))
    }
}
