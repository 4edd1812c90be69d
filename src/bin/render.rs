//! Renders one dashboard route to stdout without starting the server.
//!
//! Usage: cargo run --bin render -- /company/c3?tab=risk
//!
//! Redirects print their `Location`; 4xx/5xx responses exit non-zero.

use std::env;

use holdco::config::Config;
use holdco::seed::Portfolio;
use holdco::server::{Dashboard, Request};

fn main() {
    let target = env::args().nth(1).unwrap_or_else(|| "/".to_string());

    let req = match Request::get(&target) {
        Ok(r) => r,
        Err(err) => {
            eprintln!("bad target {:?}: {:#}", target, err);
            std::process::exit(2);
        }
    };

    let dashboard = Dashboard::new(Portfolio::seed(), Config::from_env());
    let resp = dashboard.handle(&req);

    if resp.status == 303 {
        println!("{}", resp.header("Location").unwrap_or("/"));
        return;
    }
    println!("{}", resp.body);
    if resp.status >= 400 {
        eprintln!("{} returned HTTP {}", target, resp.status);
        std::process::exit(1);
    }
}
