//! Integration tests for the HTTP accounting client.
//!
//! These spin up a throwaway HTTP/1.1 responder on a random local port and
//! point `HttpAccounting` at it, so the real request path (URL building,
//! headers, body encoding, status mapping) is exercised end to end.

#[cfg(feature = "http")]
mod http {
    use std::sync::{Arc, Mutex};

    use adreward_accounting::{Accounting, AccountingError, HttpAccounting, HttpConfig};
    use adreward_credentials::Credentials;
    use adreward_protocol::{AdId, Credits, Role, UserId};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// A request as the stub server saw it.
    #[derive(Debug, Clone)]
    struct Seen {
        request_line: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl Seen {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// Starts a responder that answers every request with `status` and
    /// `body`, recording what it received. Returns the base URL.
    async fn stub(status: u16, body: &'static str) -> (String, Arc<Mutex<Vec<Seen>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];

                // Read until the end of the header block.
                let header_end = loop {
                    let n = stream.read(&mut chunk).await.expect("read");
                    if n == 0 {
                        break None;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        break Some(pos + 4);
                    }
                };
                let Some(header_end) = header_end else { continue };

                let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
                let mut lines = head.split("\r\n");
                let request_line = lines.next().unwrap_or_default().to_string();
                let headers: Vec<(String, String)> = lines
                    .filter_map(|l| l.split_once(':'))
                    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                    .collect();
                let content_length = headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.parse::<usize>().ok())
                    .unwrap_or(0);

                while buf.len() < header_end + content_length {
                    let n = stream.read(&mut chunk).await.expect("read body");
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                let body_text = String::from_utf8_lossy(&buf[header_end..]).to_string();

                log.lock().unwrap().push(Seen {
                    request_line,
                    headers,
                    body: body_text,
                });

                let response = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{addr}/api"), seen)
    }

    fn client(base: &str) -> HttpAccounting {
        let creds = Credentials::new("tok-42", Role::User).unwrap();
        HttpAccounting::new(&HttpConfig::new(base), &creds).expect("client")
    }

    #[tokio::test]
    async fn test_confirm_view_posts_with_bearer_header() {
        let (base, seen) = stub(200, "").await;

        client(&base)
            .confirm_view(&AdId::new("ad-9"))
            .await
            .expect("confirm");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].request_line, "POST /api/ads/ad-9/confirm HTTP/1.1");
        assert_eq!(seen[0].header("authorization"), Some("Bearer tok-42"));
    }

    #[tokio::test]
    async fn test_update_balance_puts_json_body() {
        let (base, seen) = stub(204, "").await;

        client(&base)
            .update_balance(&UserId::new("u-7"), Credits(1_250))
            .await
            .expect("update");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].request_line, "PUT /api/users/u-7/balance HTTP/1.1");
        assert_eq!(seen[0].header("content-type"), Some("application/json"));
        assert_eq!(seen[0].body, r#"{"balance":1250}"#);
    }

    #[tokio::test]
    async fn test_list_ads_decodes_response() {
        let (base, _) = stub(
            200,
            r#"[{"id":"a1","title":"One","target_url":"https://one.example","price":4}]"#,
        )
        .await;

        let ads = client(&base).list_ads().await.expect("ads");

        assert_eq!(ads.len(), 1);
        assert_eq!(ads[0].id, AdId::new("a1"));
        assert_eq!(ads[0].price, Credits(4));
    }

    #[tokio::test]
    async fn test_fetch_account_hits_users_me() {
        let (base, seen) = stub(200, r#"{"user_id":"u-1","balance":300,"role":"admin"}"#).await;

        let account = client(&base).fetch_account().await.expect("account");

        assert_eq!(account.balance, Credits(300));
        assert!(account.role.is_admin());
        assert_eq!(
            seen.lock().unwrap()[0].request_line,
            "GET /api/users/me HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_401_maps_to_unauthorized() {
        let (base, _) = stub(401, "").await;

        let result = client(&base).cancel_view(&AdId::new("a1")).await;

        assert!(matches!(result, Err(AccountingError::Unauthorized(401))));
        assert!(result.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn test_500_maps_to_status_error() {
        let (base, _) = stub(500, "").await;

        let result = client(&base).begin_view(&AdId::new("a1")).await;

        assert!(matches!(
            result,
            Err(AccountingError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_undecodable_body_maps_to_protocol_error() {
        let (base, _) = stub(200, "<html>oops</html>").await;

        let result = client(&base).fetch_account().await;

        assert!(matches!(result, Err(AccountingError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_request_error() {
        // Bind then drop to get a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client(&format!("http://{addr}/")).begin_view(&AdId::new("a1")).await;

        assert!(matches!(result, Err(AccountingError::Request(_))));
    }
}
