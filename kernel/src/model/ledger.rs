use crate::model::{id::SlotId, reservation::Reservation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use std::collections::BTreeMap;
use strum::Display;

/// スペース番号ごとの予約台帳。
///
/// 各スペースの予約リストは常に長さ 0 か 1 で、同じ車両番号・メールアドレスは
/// 複数のスペースに同時に現れない。保存形式は `{"1": [...], "2": [], ...}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    slots: BTreeMap<SlotId, Vec<Reservation>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DuplicateField {
    #[strum(serialize = "car number")]
    CarNumber,
    #[strum(serialize = "email")]
    Email,
}

impl Ledger {
    pub fn empty(slot_count: u8) -> Self {
        Self {
            slots: SlotId::all(slot_count).map(|id| (id, Vec::new())).collect(),
        }
    }

    /// 保存済みの台帳を読み込む。設定より多いスペースは捨て、足りないスペースは空で補う。
    ///
    /// 1 つのスペースに複数の予約がある、キーと `slotId` が食い違う、
    /// 車両番号・メールアドレスが複数のスペースに現れる台帳は受け付けない。
    pub fn normalized(self, slot_count: u8) -> AppResult<Self> {
        let mut ledger = Self::empty(slot_count);
        for (slot_id, mut reservations) in self.slots {
            if !ledger.contains(slot_id) {
                continue;
            }
            if reservations.len() > 1 {
                return Err(AppError::ConversionEntityError(format!(
                    "stored slot {slot_id} holds {} reservations",
                    reservations.len()
                )));
            }
            let Some(reservation) = reservations.pop() else {
                continue;
            };
            if reservation.slot_id != slot_id {
                return Err(AppError::ConversionEntityError(format!(
                    "stored reservation under slot {slot_id} is marked as slot {}",
                    reservation.slot_id
                )));
            }
            ledger
                .insert(reservation)
                .map_err(|e| AppError::ConversionEntityError(format!("stored ledger: {e}")))?;
        }
        Ok(ledger)
    }

    pub fn contains(&self, slot_id: SlotId) -> bool {
        self.slots.contains_key(&slot_id)
    }

    pub fn is_available(&self, slot_id: SlotId) -> AppResult<bool> {
        self.slots
            .get(&slot_id)
            .map(|r| r.is_empty())
            .ok_or(AppError::UnknownSlot(slot_id.raw()))
    }

    pub fn occupant(&self, slot_id: SlotId) -> Option<&Reservation> {
        self.slots.get(&slot_id).and_then(|r| r.first())
    }

    pub fn first_available(&self) -> Option<SlotId> {
        self.slots
            .iter()
            .find(|(_, r)| r.is_empty())
            .map(|(id, _)| *id)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.values().filter(|r| !r.is_empty()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, Option<&Reservation>)> {
        self.slots.iter().map(|(id, r)| (*id, r.first()))
    }

    /// 他のスペースで同じ車両番号かメールアドレスが使われていないかを調べる
    pub fn find_duplicate(
        &self,
        car_number: &str,
        email: &str,
        except: Option<SlotId>,
    ) -> Option<(SlotId, DuplicateField)> {
        self.iter()
            .filter(|(id, _)| Some(*id) != except)
            .find_map(|(id, occupant)| {
                let occupant = occupant?;
                if occupant.car_number == car_number {
                    Some((id, DuplicateField::CarNumber))
                } else if occupant.email == email {
                    Some((id, DuplicateField::Email))
                } else {
                    None
                }
            })
    }

    pub fn insert(&mut self, reservation: Reservation) -> AppResult<()> {
        let slot_id = reservation.slot_id;
        if !self.is_available(slot_id)? {
            return Err(AppError::SlotOccupied(slot_id.raw()));
        }
        if let Some((other, field)) =
            self.find_duplicate(&reservation.car_number, &reservation.email, Some(slot_id))
        {
            return Err(AppError::DuplicateIdentity {
                field: field.to_string(),
                slot_id: other.raw(),
            });
        }
        self.slots.entry(slot_id).or_default().push(reservation);
        Ok(())
    }

    /// 予約を取り除いて返す。もともと空なら None
    pub fn clear(&mut self, slot_id: SlotId) -> AppResult<Option<Reservation>> {
        let reservations = self
            .slots
            .get_mut(&slot_id)
            .ok_or(AppError::UnknownSlot(slot_id.raw()))?;
        Ok(std::mem::take(reservations).into_iter().next())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FreedBy {
    Admin,
    Sensor,
}

// 台帳の変更通知。ビューはこれを購読して再描画する
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerChange {
    Reserved(Reservation),
    Freed { slot_id: SlotId, by: FreedBy },
}

impl LedgerChange {
    pub fn slot_id(&self) -> SlotId {
        match self {
            LedgerChange::Reserved(r) => r.slot_id,
            LedgerChange::Freed { slot_id, .. } => *slot_id,
        }
    }
}
