use crate::model::notification::Notification;

/// 通知は送りっぱなしで、呼び出し元を待たせない。失敗はログに残すだけ。
pub trait NotificationRepository: Send + Sync {
    fn notify(&self, notification: Notification);
}
