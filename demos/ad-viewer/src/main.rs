use std::sync::Arc;
use std::time::Duration;

use adreward::accounting::AccountingError;
use adreward::prelude::*;
use adreward::timer::NoticeReceiver;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn demo_account() -> Account {
    Account {
        user_id: UserId::new("demo-user"),
        balance: Credits::from_parts(1, 50),
        role: Role::User,
    }
}

fn demo_ads() -> Vec<Ad> {
    vec![
        Ad {
            id: AdId::new("coffee"),
            title: "Fresh roasted coffee".into(),
            target_url: "https://coffee.example".into(),
            price: Credits(25),
        },
        Ad {
            id: AdId::new("bikes"),
            title: "City bikes on sale".into(),
            target_url: "https://bikes.example".into(),
            price: Credits(40),
        },
        Ad {
            id: AdId::new("books"),
            title: "Second-hand books".into(),
            target_url: "https://books.example".into(),
            price: Credits(10),
        },
    ]
}

/// Short views so the script finishes in a few seconds.
fn demo_reward_config() -> RewardConfig {
    RewardConfig {
        view_duration_secs: 5,
        tick_period: Duration::from_millis(200),
        ..RewardConfig::default()
    }
}

/// Forwards to an in-memory ledger the script can inspect afterwards.
struct DemoAccounting(Arc<MemoryAccounting>);

impl Accounting for DemoAccounting {
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

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// Plays three views: one rewarded, one without a click, one abandoned by
/// leaving the page. Returns the final balance.
async fn run_script<A: Accounting>(
    client: &AdRewardClient<A>,
    config: &RewardConfig,
) -> Result<Credits, AdRewardError> {
    let full_view = config.tick_period * (config.view_duration_secs + 1);

    for ad in client.ads() {
        println!("  [{}] {} pays {}", ad.id, ad.title, ad.price);
    }

    println!("\nviewing coffee and clicking through");
    client.select(&AdId::new("coffee")).await?;
    let url = client.click_through().await?;
    println!("  opened {url}");
    tokio::time::sleep(full_view).await;

    println!("\nviewing bikes without clicking");
    client.select(&AdId::new("bikes")).await?;
    tokio::time::sleep(full_view).await;

    println!("\nviewing books, then switching tabs");
    client.select(&AdId::new("books")).await?;
    client.click_through().await?;
    tokio::time::sleep(config.tick_period * 2).await;
    client.page_hidden().await?;
    tokio::time::sleep(config.tick_period).await;
    let verdict = client.page_visible().await?;
    println!("  came back: {verdict:?}");

    let snapshot = client.snapshot().await?;
    Ok(snapshot.balance)
}

fn print_notices(mut notices: NoticeReceiver) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            match notice {
                Notice::Rewarded { ad_id, amount, balance } => {
                    println!("  + {amount} for {ad_id}, balance now {balance}")
                }
                Notice::NoReward { ad_id } => println!("  no reward for {ad_id}: no click-through"),
                Notice::Warning(msg) => println!("  warning: {msg}"),
                Notice::Error(msg) => println!("  error: {msg}"),
                Notice::AuthRequired => println!("  please sign in again"),
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("warn,adreward_timer=info");

    let config = demo_reward_config();
    let ledger = Arc::new(MemoryAccounting::new(demo_account(), demo_ads()));
    let store = MemoryCredentialStore::with(Credentials::new("demo-token", Role::User)?);

    let (client, notices) = AdRewardClient::builder()
        .reward_config(config.clone())
        .build_with_store(&store, DemoAccounting(Arc::clone(&ledger)))
        .await?;
    let printer = print_notices(notices);

    println!("signed in as {}, balance {}", client.account().user_id, client.account().balance);
    let balance = run_script(&client, &config).await?;
    println!("\nfinal balance {balance} ({} accounting calls)", ledger.calls().len());

    client.sign_out(&store).await?;
    printer.await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_script_rewards_only_the_clicked_full_view() {
        let config = demo_reward_config();
        let ledger = Arc::new(MemoryAccounting::new(demo_account(), demo_ads()));
        let store = MemoryCredentialStore::with(Credentials::new("demo-token", Role::User).unwrap());
        let (client, mut notices) = AdRewardClient::builder()
            .reward_config(config.clone())
            .build_with_store(&store, DemoAccounting(Arc::clone(&ledger)))
            .await
            .unwrap();

        let balance = run_script(&client, &config).await.unwrap();

        assert_eq!(balance, Credits(175));
        assert_eq!(ledger.account().balance, Credits(175));
        assert!(matches!(notices.recv().await, Some(Notice::Rewarded { .. })));
        assert!(matches!(notices.recv().await, Some(Notice::NoReward { .. })));
        assert!(matches!(notices.recv().await, Some(Notice::Warning(_))));
    }
}
