use crate::model::id::SlotId;
use derive_new::new;

#[derive(new, Debug, Clone)]
pub struct CreateReservation {
    // None の場合は空いている最初のスペースを予約する
    pub slot_id: Option<SlotId>,
    pub full_name: String,
    pub car_number: String,
    pub email: String,
}
