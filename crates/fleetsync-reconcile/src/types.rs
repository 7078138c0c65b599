use serde::{Deserialize, Serialize};

use crate::ReconcileError;

/// The two fleet-status platforms being reconciled.
///
/// The engine always treats Divera as the **left** side and Stein as the
/// **right** side of a [`MatchedPair`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Divera 24/7: integer FMS status codes, epoch-second timestamps.
    Divera,
    /// stein.app: string status tokens, ISO-8601 timestamps with offset.
    Stein,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Divera => "divera",
            Platform::Stein => "stein",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a record inside a [`MatchedPair`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn platform(&self) -> Platform {
        match self {
            Side::Left => Platform::Divera,
            Side::Right => Platform::Stein,
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Engine-internal status vocabulary bridging both platforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalStatus {
    Ready,
    SemiReady,
    NotReady,
    InUse,
    Maintenance,
}

impl CanonicalStatus {
    pub const ALL: [CanonicalStatus; 5] = [
        CanonicalStatus::Ready,
        CanonicalStatus::SemiReady,
        CanonicalStatus::NotReady,
        CanonicalStatus::InUse,
        CanonicalStatus::Maintenance,
    ];
}

/// A status value in a platform's own vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeStatus {
    /// Divera FMS status code.
    Divera(i64),
    /// Stein status token (`ready`, `inuse`, ...).
    Stein(String),
}

impl NativeStatus {
    pub fn platform(&self) -> Platform {
        match self {
            NativeStatus::Divera(_) => Platform::Divera,
            NativeStatus::Stein(_) => Platform::Stein,
        }
    }

    /// The Divera code, if this is a Divera status.
    pub fn as_divera_code(&self) -> Option<i64> {
        match self {
            NativeStatus::Divera(c) => Some(*c),
            NativeStatus::Stein(_) => None,
        }
    }

    /// The Stein token, if this is a Stein status.
    pub fn as_stein_token(&self) -> Option<&str> {
        match self {
            NativeStatus::Stein(t) => Some(t.as_str()),
            NativeStatus::Divera(_) => None,
        }
    }
}

impl std::fmt::Display for NativeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeStatus::Divera(c) => write!(f, "{c}"),
            NativeStatus::Stein(t) => f.write_str(t),
        }
    }
}

/// A timestamp exactly as the platform delivered it.
///
/// Normalization to an absolute instant happens in
/// [`TimestampNormalizer`](crate::TimestampNormalizer), so that a malformed
/// value only affects the pair it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawTimestamp {
    /// Divera `fmsstatus_ts`: seconds since the Unix epoch.
    EpochSeconds(i64),
    /// Stein `lastModified`: ISO-8601 with UTC offset.
    Iso8601(String),
}

impl std::fmt::Display for RawTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawTimestamp::EpochSeconds(s) => write!(f, "{s}"),
            RawTimestamp::Iso8601(s) => f.write_str(s),
        }
    }
}

/// Platform-agnostic projection of one vehicle as seen by one platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRecord {
    /// Shared human identifier (Divera `number`, Stein `name`).
    pub match_key: String,
    pub status: NativeStatus,
    /// Normalized comment: never null, no line breaks.
    pub comment: String,
    pub last_modified: RawTimestamp,
    /// Platform-native id used to write back to that platform.
    pub source_id: String,
    /// Human label, used in log lines only.
    pub display_name: String,
    /// Stein asset group; `None` for Divera vehicles.
    pub group_id: Option<i64>,
}

impl AssetRecord {
    /// Build a record; `comment` is normalized on the way in.
    pub fn new(
        match_key: impl Into<String>,
        status: NativeStatus,
        comment: Option<&str>,
        last_modified: RawTimestamp,
        source_id: impl Into<String>,
    ) -> Self {
        let match_key = match_key.into();
        Self {
            display_name: match_key.clone(),
            match_key,
            status,
            comment: normalize_comment(comment),
            last_modified,
            source_id: source_id.into(),
            group_id: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_group_id(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn platform(&self) -> Platform {
        self.status.platform()
    }
}

/// `None` becomes `""`; every line break (`\r\n`, `\n`, `\r`) becomes a single
/// space. Both platforms' comments go through this before comparison and
/// before being pushed.
pub fn normalize_comment(raw: Option<&str>) -> String {
    match raw {
        None => String::new(),
        Some(s) => s.replace("\r\n", " ").replace(['\n', '\r'], " "),
    }
}

/// Two records (Divera left, Stein right) sharing a `match_key`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchedPair {
    pub left: AssetRecord,
    pub right: AssetRecord,
}

impl MatchedPair {
    pub fn match_key(&self) -> &str {
        &self.left.match_key
    }

    pub fn record(&self, side: Side) -> &AssetRecord {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Operator-selected sync policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    /// Newest timestamp wins; ties go to the right side.
    #[default]
    Bidirectional,
    /// Divera is always authoritative (Stein gets overwritten).
    ForceLeft,
    /// Stein is always authoritative (Divera gets overwritten).
    ForceRight,
}

impl SyncDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncDirection::Bidirectional => "bidirectional",
            SyncDirection::ForceLeft => "force_left",
            SyncDirection::ForceRight => "force_right",
        }
    }

    /// Accepts the config spellings plus the operator aliases
    /// `both`, `stein` ("overwrite stein") and `divera` ("overwrite divera").
    pub fn parse(s: &str) -> Result<Self, ReconcileError> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "bidirectional" | "both" => Ok(SyncDirection::Bidirectional),
            "force_left" | "stein" => Ok(SyncDirection::ForceLeft),
            "force_right" | "divera" => Ok(SyncDirection::ForceRight),
            other => Err(ReconcileError::UnknownDirection(other.to_string())),
        }
    }
}

impl std::fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What gets written to the lagging platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdatePayload {
    /// Status already translated into the target platform's vocabulary.
    pub status: NativeStatus,
    pub comment: String,
}

/// Outcome of reconciling one pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncDecision {
    NoOp,
    /// Write `payload` to the left platform (Divera).
    UpdateLeft { payload: UpdatePayload },
    /// Write `payload` to the right platform (Stein).
    UpdateRight { payload: UpdatePayload },
}

impl SyncDecision {
    pub fn is_noop(&self) -> bool {
        matches!(self, SyncDecision::NoOp)
    }

    /// Side that receives the write, if any.
    pub fn target(&self) -> Option<Side> {
        match self {
            SyncDecision::NoOp => None,
            SyncDecision::UpdateLeft { .. } => Some(Side::Left),
            SyncDecision::UpdateRight { .. } => Some(Side::Right),
        }
    }

    pub fn payload(&self) -> Option<&UpdatePayload> {
        match self {
            SyncDecision::NoOp => None,
            SyncDecision::UpdateLeft { payload } | SyncDecision::UpdateRight { payload } => {
                Some(payload)
            }
        }
    }
}
