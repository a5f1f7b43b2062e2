use serde::{Deserialize, Serialize};
use std::fmt;

// 駐車スペースの番号。1 始まり
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(u8);

impl SlotId {
    pub fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    /// 1..=count の全スペースを順に返す
    pub fn all(count: u8) -> impl Iterator<Item = SlotId> {
        (1..=count).map(SlotId)
    }

    /// センサー配列上の位置
    pub fn index(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl From<u8> for SlotId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
