/*
[INPUT]:  Running backend at the default API root
[OUTPUT]: Authenticated demo session and guarded navigation
[POS]:    Examples - wallet login flow demonstration
[UPDATE]: When auth flow changes
*/

use std::sync::Arc;

use ijazah_adapter::*;

/// Example: demo-wallet login
///
/// 1. Create HTTP client and session store
/// 2. Connect the simulated wallet
/// 3. Request challenge, sign it, verify it
/// 4. Ask the route guard about the admin pages
#[tokio::main]
async fn main() {
    println!("=== Ijazah Demo Login ===\n");

    let client = match IjazahClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created ({})", client.base_url());

    let store = AuthStore::new(Arc::new(client), Arc::new(MemorySessionStorage::new()));
    let guard = RouteGuard::new(store.clone());

    let provider = Arc::new(DemoWalletProvider::new());
    let wallet = WalletConnector::new(provider.clone());
    println!("✓ Demo wallet {}", provider.address());

    match store.authenticate(&wallet).await {
        Ok(user) => println!("✓ Signed in as {} ({})", user.address, user.role),
        Err(e) => {
            eprintln!("Login failed: {}", e);
            return;
        }
    }

    for path in ["/admin/issue", "/verify", "/certificate/CERT_1"] {
        let navigation = guard.before_each(path).await;
        println!("  {path} -> {navigation:?}");
    }

    store.logout().await;
    println!("\n✓ Demo login complete");
}
