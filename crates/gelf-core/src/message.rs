//! GELF message model.
//!
//! The publisher only needs three things from a message: whether the
//! required fields are present, an ordered field map to serialize, and a
//! slot for the protocol version. `GelfPayload` is that contract;
//! `GelfMessage` is the standard implementation.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};

/// Fields every GELF message must carry.
pub const REQUIRED_FIELDS: [&str; 2] = ["host", "short_message"];

/// What the publisher requires of a message.
pub trait GelfPayload {
    /// True when `host` and `short_message` are present and non-blank.
    fn has_required_fields(&self) -> bool;

    /// Names of the required fields that are missing. Empty when
    /// `has_required_fields` is true.
    fn missing_fields(&self) -> Vec<&'static str>;

    /// Field name → value, in serialization order.
    fn to_map(&self) -> Map<String, Value>;

    fn set_protocol_version(&mut self, version: &str);
}

/// Syslog severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Level {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Informational = 6,
    Debug = 7,
}

impl Level {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Emergency),
            1 => Some(Self::Alert),
            2 => Some(Self::Critical),
            3 => Some(Self::Error),
            4 => Some(Self::Warning),
            5 => Some(Self::Notice),
            6 => Some(Self::Informational),
            7 => Some(Self::Debug),
            _ => None,
        }
    }

    /// Accepts a numeric severity or a name ("warn", "error", ...).
    pub fn parse(s: &str) -> Option<Self> {
        if let Ok(n) = s.parse::<u8>() {
            return Self::from_u8(n);
        }
        match s.to_ascii_lowercase().as_str() {
            "emergency" | "emerg" => Some(Self::Emergency),
            "alert" => Some(Self::Alert),
            "critical" | "crit" => Some(Self::Critical),
            "error" | "err" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "notice" => Some(Self::Notice),
            "informational" | "info" => Some(Self::Informational),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level as u8
    }
}

/// A structured log event.
#[derive(Debug, Clone, Default)]
pub struct GelfMessage {
    version: Option<String>,
    host: String,
    short_message: String,
    full_message: Option<String>,
    /// Seconds since the Unix epoch, millisecond precision.
    timestamp: Option<f64>,
    level: Option<Level>,
    facility: Option<String>,
    file: Option<String>,
    line: Option<u32>,
    /// Additional fields, stored with their leading underscore.
    additional: Vec<(String, Value)>,
}

impl GelfMessage {
    pub fn new(host: impl Into<String>, short_message: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            short_message: short_message.into(),
            ..Self::default()
        }
    }

    pub fn with_full_message(mut self, full_message: impl Into<String>) -> Self {
        self.full_message = Some(full_message.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Stamp the current wall-clock time.
    pub fn with_current_timestamp(self) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        self.with_timestamp(millis as f64 / 1000.0)
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_facility(mut self, facility: impl Into<String>) -> Self {
        self.facility = Some(facility.into());
        self
    }

    pub fn with_source(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Add an additional field. A leading underscore is added when missing.
    /// Re-adding a name replaces its value in place.
    pub fn add_field(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self, MessageError> {
        let key = if name.starts_with('_') {
            name.to_string()
        } else {
            format!("_{name}")
        };
        validate_field_name(&key)?;

        let value = value.into();
        match self.additional.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.additional.push((key, value)),
        }
        Ok(self)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn short_message(&self) -> &str {
        &self.short_message
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.additional
            .iter()
            .find(|(k, _)| k == name || k.strip_prefix('_') == Some(name))
            .map(|(_, v)| v)
    }
}

impl GelfPayload for GelfMessage {
    fn has_required_fields(&self) -> bool {
        self.missing_fields().is_empty()
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.host.trim().is_empty() {
            missing.push(REQUIRED_FIELDS[0]);
        }
        if self.short_message.trim().is_empty() {
            missing.push(REQUIRED_FIELDS[1]);
        }
        missing
    }

    fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(version) = &self.version {
            map.insert("version".into(), version.clone().into());
        }
        map.insert("host".into(), self.host.clone().into());
        map.insert("short_message".into(), self.short_message.clone().into());
        if let Some(full) = &self.full_message {
            map.insert("full_message".into(), full.clone().into());
        }
        if let Some(ts) = self.timestamp {
            map.insert("timestamp".into(), ts.into());
        }
        if let Some(level) = self.level {
            map.insert("level".into(), u8::from(level).into());
        }
        if let Some(facility) = &self.facility {
            map.insert("facility".into(), facility.clone().into());
        }
        if let Some(file) = &self.file {
            map.insert("file".into(), file.clone().into());
        }
        if let Some(line) = self.line {
            map.insert("line".into(), line.into());
        }
        for (key, value) in &self.additional {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    fn set_protocol_version(&mut self, version: &str) {
        self.version = Some(version.to_string());
    }
}

/// Additional field names: `_` followed by `[A-Za-z0-9_.-]+`, never `_id`.
fn validate_field_name(key: &str) -> Result<(), MessageError> {
    if key == "_id" {
        return Err(MessageError::ReservedField(key.to_string()));
    }
    let body = &key[1..];
    let valid = !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if !valid {
        return Err(MessageError::InvalidFieldName(key.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    #[error("additional field name {0:?} is reserved")]
    ReservedField(String),

    #[error("invalid additional field name {0:?}")]
    InvalidFieldName(String),
}
