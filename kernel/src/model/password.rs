use rand::{distributions::Alphanumeric, Rng};

/// a-z, A-Z, 0-9 の 62 文字から一様に選んだ照会用パスワード。
/// 予約間での重複チェックはしない。
pub fn generate_password(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
