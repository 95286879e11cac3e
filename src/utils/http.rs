use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::Client;

// Generation calls set their own request timeout from config; only the
// connect phase is bounded here.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client")
});

pub fn get_http_client() -> &'static Client {
    &HTTP_CLIENT
}
