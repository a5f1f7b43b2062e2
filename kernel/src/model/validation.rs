//! 予約フォームの入力チェック。
//!
//! どれも前後の空白の除去や大文字小文字の変換はしないので、呼び出し側で
//! trim してから渡すこと。

/// 英字だけの 2 語（名と姓）を半角スペース 1 つで区切ったもの
pub fn validate_full_name(name: &str) -> bool {
    match name.split_once(' ') {
        Some((first, last)) => is_alpha_word(first) && is_alpha_word(last),
        None => false,
    }
}

/// 区切り文字なしの 7 桁または 8 桁の数字
pub fn validate_car_number(number: &str) -> bool {
    (7..=8).contains(&number.len()) && number.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || !local.bytes().all(is_local_part_byte) {
        return false;
    }
    // ドメインは最後のドットで分け、末尾のラベルは 2 文字以上の英字
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && host.bytes().all(is_domain_byte)
        && tld.len() >= 2
        && tld.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_alpha_word(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_local_part_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'%' | b'+' | b'-')
}

fn is_domain_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-')
}
