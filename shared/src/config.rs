use anyhow::{ensure, Context, Result};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_RESERVATION_WEBHOOK_URL: &str =
    "https://hook.eu2.make.com/2qd9zbx2kcgjxl00qscmc6e25rc4olfe";
const DEFAULT_SLOT_FREED_WEBHOOK_URL: &str =
    "https://hook.eu2.make.com/4c3kuk26trxfw6wzye2m14xipj8y3wm1";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub sensor: SensorConfig,
    pub notifier: NotifierConfig,
    pub view: ViewConfig,
    pub occupancy: OccupancyConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の取得関数から設定を組み立てる。未設定の項目は既定値になる。
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string());

        let server = ServerConfig {
            host: parse_or(&get, "HOST", defaults.server.host)?,
            port: parse_or(&get, "PORT", defaults.server.port)?,
        };

        // LEDGER_PATH を空文字にするとファイルに書き出さない
        let ledger_path = match get("LEDGER_PATH") {
            None => defaults.ledger.path,
            Some(v) if v.is_empty() => None,
            Some(v) => Some(PathBuf::from(v)),
        };
        let ledger = LedgerConfig {
            path: ledger_path,
            slot_count: parse_or(&get, "SLOT_COUNT", defaults.ledger.slot_count)?,
            password_length: parse_or(&get, "PASSWORD_LENGTH", defaults.ledger.password_length)?,
        };
        ensure!(ledger.slot_count >= 1, "SLOT_COUNT must be at least 1");
        ensure!(
            ledger.password_length >= 1,
            "PASSWORD_LENGTH must be at least 1"
        );

        let sensor = SensorConfig {
            base_url: get("SENSOR_BASE_URL").unwrap_or(defaults.sensor.base_url),
            poll_interval: millis_or(&get, "SENSOR_POLL_INTERVAL_MS", defaults.sensor.poll_interval)?,
            request_timeout: millis_or(
                &get,
                "SENSOR_REQUEST_TIMEOUT_MS",
                defaults.sensor.request_timeout,
            )?,
        };

        let notifier = NotifierConfig {
            reservation_webhook_url: get("RESERVATION_WEBHOOK_URL")
                .unwrap_or(defaults.notifier.reservation_webhook_url),
            slot_freed_webhook_url: get("SLOT_FREED_WEBHOOK_URL")
                .unwrap_or(defaults.notifier.slot_freed_webhook_url),
            max_attempts: parse_or(&get, "NOTIFIER_MAX_ATTEMPTS", defaults.notifier.max_attempts)?,
            base_delay: millis_or(&get, "NOTIFIER_BASE_DELAY_MS", defaults.notifier.base_delay)?,
            queue_capacity: parse_or(
                &get,
                "NOTIFIER_QUEUE_CAPACITY",
                defaults.notifier.queue_capacity,
            )?,
        };
        ensure!(
            notifier.queue_capacity >= 1,
            "NOTIFIER_QUEUE_CAPACITY must be at least 1"
        );

        let view = ViewConfig {
            user_refresh: millis_or(&get, "USER_VIEW_REFRESH_MS", defaults.view.user_refresh)?,
            admin_refresh: millis_or(&get, "ADMIN_VIEW_REFRESH_MS", defaults.view.admin_refresh)?,
        };

        let occupancy = OccupancyConfig {
            alert_after_polls: parse_or(
                &get,
                "OCCUPANCY_ALERT_AFTER_POLLS",
                defaults.occupancy.alert_after_polls,
            )?,
        };
        ensure!(
            occupancy.alert_after_polls >= 1,
            "OCCUPANCY_ALERT_AFTER_POLLS must be at least 1"
        );

        Ok(Self {
            server,
            ledger,
            sensor,
            notifier,
            view,
            occupancy,
        })
    }
}

// 参照環境（3 台分の駐車場、ESP32 の AP モード）の値
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 8080,
            },
            ledger: LedgerConfig {
                path: Some(PathBuf::from("./reservations.json")),
                slot_count: 3,
                password_length: 8,
            },
            sensor: SensorConfig {
                base_url: "http://192.168.4.1".into(),
                poll_interval: Duration::from_millis(2000),
                request_timeout: Duration::from_millis(1500),
            },
            notifier: NotifierConfig {
                reservation_webhook_url: DEFAULT_RESERVATION_WEBHOOK_URL.into(),
                slot_freed_webhook_url: DEFAULT_SLOT_FREED_WEBHOOK_URL.into(),
                max_attempts: 1,
                base_delay: Duration::from_millis(250),
                queue_capacity: 64,
            },
            view: ViewConfig {
                user_refresh: Duration::from_millis(5000),
                admin_refresh: Duration::from_millis(2000),
            },
            occupancy: OccupancyConfig {
                alert_after_polls: 3,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub path: Option<PathBuf>,
    pub slot_count: u8,
    pub password_length: usize,
}

#[derive(Debug, Clone)]
pub struct SensorConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub reservation_webhook_url: String,
    pub slot_freed_webhook_url: String,
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub queue_capacity: usize,
}

#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub user_refresh: Duration,
    pub admin_refresh: Duration,
}

#[derive(Debug, Clone)]
pub struct OccupancyConfig {
    pub alert_after_polls: u32,
}

fn parse_or<T, G>(get: &G, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(v) => v.parse().with_context(|| format!("parse {name}")),
    }
}

fn millis_or<G>(get: &G, name: &str, default: Duration) -> Result<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    let ms: u64 = parse_or(get, name, default.as_millis() as u64)?;
    ensure!(ms > 0, "{name} must be greater than zero");
    Ok(Duration::from_millis(ms))
}
