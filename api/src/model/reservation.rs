use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::SlotId,
    reservation::{event::CreateReservation, Reservation},
    validation::{validate_car_number, validate_email, validate_full_name},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    #[garde(custom(self::full_name))]
    pub full_name: String,
    #[garde(custom(self::car_number))]
    pub car_number: String,
    #[garde(custom(self::email))]
    pub email: String,
}

impl CreateReservationRequest {
    // フォーム入力の前後の空白は検証前に落とす
    pub fn trimmed(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            car_number: self.car_number.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

fn full_name(value: &str, _: &()) -> garde::Result {
    if validate_full_name(value) {
        Ok(())
    } else {
        Err(garde::Error::new(
            "please enter a valid full name (first and last name, letters only)",
        ))
    }
}

fn car_number(value: &str, _: &()) -> garde::Result {
    if validate_car_number(value) {
        Ok(())
    } else {
        Err(garde::Error::new("please enter a valid car number (7-8 digits)"))
    }
}

fn email(value: &str, _: &()) -> garde::Result {
    if validate_email(value) {
        Ok(())
    } else {
        Err(garde::Error::new("please enter a valid email address"))
    }
}

#[derive(new)]
pub struct CreateReservationRequestWithSlot(Option<SlotId>, CreateReservationRequest);

impl From<CreateReservationRequestWithSlot> for CreateReservation {
    fn from(value: CreateReservationRequestWithSlot) -> Self {
        let CreateReservationRequestWithSlot(
            slot_id,
            CreateReservationRequest {
                full_name,
                car_number,
                email,
            },
        ) = value;
        CreateReservation::new(slot_id, full_name, car_number, email)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub slot_id: SlotId,
    pub full_name: String,
    pub car_number: String,
    pub email: String,
    pub password: String,
}

impl From<Reservation> for ReservationResponse {
    fn from(value: Reservation) -> Self {
        let Reservation {
            full_name,
            car_number,
            email,
            password,
            slot_id,
        } = value;
        Self {
            slot_id,
            full_name,
            car_number,
            email,
            password,
        }
    }
}
