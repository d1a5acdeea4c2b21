use std::fmt::Display;

/// Identifier of a room as annotated in the floorplan SVG and used by the
/// sensor backend. Leading and trailing whitespace is never significant.
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim();
        !query.is_empty() && self.0.to_lowercase().contains(&query.to_lowercase())
    }
}

impl Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Index into the configured floor list, lowest floor first.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FloorId(pub usize);

impl FloorId {
    pub fn index(&self) -> usize {
        self.0
    }

    /// Applies a relative floor change, refusing to leave `0..floor_count`.
    pub fn offset_within(&self, delta: isize, floor_count: usize) -> Option<FloorId> {
        let target = self.0.checked_add_signed(delta)?;
        if target < floor_count { Some(FloorId(target)) } else { None }
    }
}

impl Display for FloorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "floor {}", self.0)
    }
}
