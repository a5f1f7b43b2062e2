use crate::model::{id::SlotId, ledger::Ledger, sensor::OccupancySnapshot};
use serde::Serialize;
use std::collections::BTreeMap;

// センサーと台帳の食い違いの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscrepancyKind {
    /// 在車しているのに予約が無い
    Unreserved,
    /// 予約があるのに車がいない
    Vacant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    pub slot_id: SlotId,
    pub kind: DiscrepancyKind,
    pub polls: u32,
}

/// センサーの在車状態と台帳を突き合わせ、同じ食い違いが `threshold` 回連続
/// したスペースを報告する。台帳は変更しない。
#[derive(Debug, Clone)]
pub struct OccupancyTracker {
    threshold: u32,
    streaks: BTreeMap<SlotId, (DiscrepancyKind, u32)>,
}

impl OccupancyTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            streaks: BTreeMap::new(),
        }
    }

    /// 今回のポーリングでしきい値に達した食い違いだけを返す（連続中は 1 回だけ）
    pub fn observe(&mut self, ledger: &Ledger, snapshot: &OccupancySnapshot) -> Vec<Discrepancy> {
        let mut raised = Vec::new();
        for (slot_id, occupant) in ledger.iter() {
            let kind = match (snapshot.is_occupied(slot_id), occupant.is_some()) {
                (Some(true), false) => DiscrepancyKind::Unreserved,
                (Some(false), true) => DiscrepancyKind::Vacant,
                _ => {
                    self.streaks.remove(&slot_id);
                    continue;
                }
            };

            let streak = self.streaks.entry(slot_id).or_insert((kind, 0));
            if streak.0 != kind {
                *streak = (kind, 0);
            }
            streak.1 += 1;
            if streak.1 == self.threshold {
                raised.push(Discrepancy {
                    slot_id,
                    kind,
                    polls: streak.1,
                });
            }
        }
        // 台帳に無いスペースの記録は捨てる
        self.streaks.retain(|id, _| ledger.contains(*id));
        raised
    }

    /// しきい値を超えて続いている食い違いの一覧
    pub fn active(&self) -> Vec<Discrepancy> {
        self.streaks
            .iter()
            .filter(|(_, (_, polls))| *polls >= self.threshold)
            .map(|(slot_id, (kind, polls))| Discrepancy {
                slot_id: *slot_id,
                kind: *kind,
                polls: *polls,
            })
            .collect()
    }
}
