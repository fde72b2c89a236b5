//! Integration tests for the client facade.
//!
//! Most tests build the client over `MemoryAccounting` on a paused clock.
//! The `connect` tests go through real HTTP against a local responder, so
//! they run on the normal clock.

use std::sync::Arc;
use std::time::Duration;

use adreward::accounting::{AccountingError, Operation};
use adreward::prelude::*;
use adreward::timer::TimerError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn account() -> Account {
    Account {
        user_id: UserId::new("u-1"),
        balance: Credits(100),
        role: Role::User,
    }
}

fn ads() -> Vec<Ad> {
    vec![
        Ad {
            id: AdId::new("a1"),
            title: "First".into(),
            target_url: "https://first.example".into(),
            price: Credits(5),
        },
        Ad {
            id: AdId::new("a2"),
            title: "Second".into(),
            target_url: "https://second.example".into(),
            price: Credits(12),
        },
    ]
}

/// Lets `MemoryAccounting` be shared between the client and the test.
struct Shared(Arc<MemoryAccounting>);

impl Accounting for Shared {
    async fn begin_view(&self, ad_id: &AdId) -> Result<(), AccountingError> {
        self.0.begin_view(ad_id).await
    }

    async fn confirm_view(&self, ad_id: &AdId) -> Result<(), AccountingError> {
        self.0.confirm_view(ad_id).await
    }

    async fn cancel_view(&self, ad_id: &AdId) -> Result<(), AccountingError> {
        self.0.cancel_view(ad_id).await
    }

    async fn update_balance(&self, user_id: &UserId, balance: Credits) -> Result<(), AccountingError> {
        self.0.update_balance(user_id, balance).await
    }

    async fn list_ads(&self) -> Result<Vec<Ad>, AccountingError> {
        self.0.list_ads().await
    }

    async fn fetch_account(&self) -> Result<Account, AccountingError> {
        self.0.fetch_account().await
    }
}

fn short_views() -> RewardConfig {
    RewardConfig::with_duration(5)
}

// =========================================================================
// build()
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_build_loads_account_and_ads() {
    let memory = Arc::new(MemoryAccounting::new(account(), ads()));

    let (client, _notices) = AdRewardClient::builder()
        .reward_config(short_views())
        .build(Shared(Arc::clone(&memory)))
        .await
        .unwrap();

    assert_eq!(client.account().balance, Credits(100));
    assert_eq!(client.role(), Role::User);
    assert_eq!(client.ads().len(), 2);
    assert_eq!(memory.count(Operation::FetchAccount), 1);
    assert_eq!(memory.count(Operation::ListAds), 1);

    let snap = client.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::Idle);
    assert_eq!(snap.remaining_seconds, 5);
}

#[tokio::test(start_paused = true)]
async fn test_full_view_through_client_credits_viewed_ad() {
    let memory = Arc::new(MemoryAccounting::new(account(), ads()));
    let (client, mut notices) = AdRewardClient::builder()
        .reward_config(short_views())
        .build(Shared(Arc::clone(&memory)))
        .await
        .unwrap();

    client.select(&AdId::new("a2")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let url = client.click_through().await.unwrap();
    assert_eq!(url, "https://second.example");
    tokio::time::sleep(Duration::from_secs(4)).await;

    assert_eq!(
        notices.recv().await,
        Some(Notice::Rewarded {
            ad_id: AdId::new("a2"),
            amount: Credits(12),
            balance: Credits(112),
        })
    );
    assert_eq!(memory.account().balance, Credits(112));
    assert_eq!(client.snapshot().await.unwrap().balance, Credits(112));
}

#[tokio::test(start_paused = true)]
async fn test_select_while_viewing_is_a_timer_error() {
    let (client, _notices) = AdRewardClient::builder()
        .build(MemoryAccounting::new(account(), ads()))
        .await
        .unwrap();

    client.select(&AdId::new("a1")).await.unwrap();
    let result = client.select(&AdId::new("a2")).await;

    assert!(matches!(
        result,
        Err(AdRewardError::Timer(TimerError::SessionActive(_)))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_build_fails_when_ads_cannot_load() {
    let memory = MemoryAccounting::new(account(), ads());
    memory.fail(Operation::ListAds);

    let result = AdRewardClient::builder().build(memory).await;

    assert!(matches!(result, Err(AdRewardError::Timer(TimerError::Accounting(_)))));
}

#[tokio::test(start_paused = true)]
async fn test_build_fails_when_account_cannot_load() {
    let memory = MemoryAccounting::new(account(), ads());
    memory.fail(Operation::FetchAccount);

    let result = AdRewardClient::builder().build(memory).await;

    assert!(matches!(
        result,
        Err(AdRewardError::Accounting(AccountingError::Unavailable(_)))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_sign_out_clears_credential_and_stops_timer() {
    let store = MemoryCredentialStore::with(Credentials::new("tok", Role::User).unwrap());
    let (client, _notices) = AdRewardClient::builder()
        .build(MemoryAccounting::new(account(), ads()))
        .await
        .unwrap();
    let timer = client.timer().clone();

    client.sign_out(&store).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(store.load().unwrap().is_none());
    assert!(timer.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_build_with_store_requires_a_credential() {
    let memory = Arc::new(MemoryAccounting::new(account(), ads()));
    let store = MemoryCredentialStore::new();

    let result = AdRewardClient::builder()
        .build_with_store(&store, Shared(Arc::clone(&memory)))
        .await;

    assert!(matches!(result, Err(AdRewardError::Unauthenticated)));
    assert!(memory.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_build_with_store_then_sign_out_empties_store() {
    let store = MemoryCredentialStore::with(Credentials::new("tok", Role::User).unwrap());

    let (client, _notices) = AdRewardClient::builder()
        .build_with_store(&store, MemoryAccounting::new(account(), ads()))
        .await
        .unwrap();
    assert_eq!(client.account().user_id, UserId::new("u-1"));

    client.sign_out(&store).await.unwrap();
    let again = AdRewardClient::builder()
        .build_with_store(&store, MemoryAccounting::new(account(), ads()))
        .await;

    assert!(matches!(again, Err(AdRewardError::Unauthenticated)));
}

// =========================================================================
// connect()
// =========================================================================

/// Serves `GET /api/users/me` and `GET /api/ads`; any other path gets 404.
/// Every response uses `status` unless it is 200.
async fn api_stub(status: u16) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            let head = String::from_utf8_lossy(&buf).to_string();
            let request_line = head.lines().next().unwrap_or_default().to_string();

            let (code, body) = if status != 200 {
                (status, String::new())
            } else if request_line.starts_with("GET /api/users/me ") {
                (200, r#"{"user_id":"u-1","balance":250,"role":"admin"}"#.to_string())
            } else if request_line.starts_with("GET /api/ads ") {
                (
                    200,
                    r#"[{"id":"a1","title":"One","target_url":"https://one.example","price":3}]"#
                        .to_string(),
                )
            } else {
                (404, String::new())
            };

            let response = format!(
                "HTTP/1.1 {code} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    format!("http://{addr}/api")
}

#[tokio::test]
async fn test_connect_without_stored_credential_is_unauthenticated() {
    let store = MemoryCredentialStore::new();

    let result = AdRewardClient::builder().connect(&store).await;

    assert!(matches!(result, Err(AdRewardError::Unauthenticated)));
}

#[tokio::test]
async fn test_connect_with_bad_base_url_is_accounting_error() {
    let store = MemoryCredentialStore::with(Credentials::new("tok", Role::User).unwrap());

    let result = AdRewardClient::builder()
        .api_base_url("not a url")
        .connect(&store)
        .await;

    assert!(matches!(
        result,
        Err(AdRewardError::Accounting(AccountingError::InvalidBaseUrl(_)))
    ));
}

#[tokio::test]
async fn test_connect_loads_account_over_http() {
    let base = api_stub(200).await;
    let store = MemoryCredentialStore::with(Credentials::new("tok", Role::Admin).unwrap());

    let (client, _notices) = AdRewardClient::builder()
        .api_base_url(&base)
        .connect(&store)
        .await
        .unwrap();

    assert_eq!(client.account().balance, Credits(250));
    assert!(client.role().is_admin());
    assert_eq!(client.ads().len(), 1);
    assert_eq!(client.ads()[0].price, Credits(3));
    client.shutdown().await;
}

#[tokio::test]
async fn test_connect_with_rejected_credential_is_unauthenticated() {
    let base = api_stub(401).await;
    let store = MemoryCredentialStore::with(Credentials::new("stale", Role::User).unwrap());

    let result = AdRewardClient::builder()
        .api_base_url(&base)
        .connect(&store)
        .await;

    assert!(matches!(result, Err(AdRewardError::Unauthenticated)));
}
