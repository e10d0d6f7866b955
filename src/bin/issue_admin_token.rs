use arogya_chat::middleware::auth::issue_token;
use arogya_chat::models::auth::Claims;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;

const DEFAULT_VALID_HOURS: i64 = 24;

fn main() {
    dotenvy::dotenv().ok();

    println!("🔐 Admin Token Issuer");
    println!("=====================");

    let mut args = std::env::args().skip(1);
    let operator = args.next().unwrap_or_else(|| "operator".to_string());
    let valid_hours = match args.next().map(|h| h.parse::<i64>()) {
        None => DEFAULT_VALID_HOURS,
        Some(Ok(hours)) if hours > 0 => hours,
        Some(_) => {
            eprintln!("❌ Validity must be a positive number of hours");
            std::process::exit(1);
        }
    };

    let secret = match std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None => {
            // Generate a 256-bit (32-byte) cryptographically secure random key
            let mut key = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut key);
            let base64_key = STANDARD.encode(key);

            println!();
            println!("JWT_SECRET is not set, generated a new one:");
            println!("Base64: {}", base64_key);
            println!("Hex:    {}", hex::encode(key));
            println!();
            println!("📝 Copy this line to your .env file:");
            println!("JWT_SECRET={}", base64_key);
            base64_key
        }
    };

    let claims = match chrono::Duration::try_hours(valid_hours)
        .and_then(|valid_for| Claims::staff(operator.clone(), valid_for))
    {
        Some(claims) => claims,
        None => {
            eprintln!("❌ Validity of {} hours is too large", valid_hours);
            std::process::exit(1);
        }
    };
    match issue_token(&claims, &secret) {
        Ok(token) => {
            println!();
            println!("Staff token for '{}' (valid {} hours):", operator, valid_hours);
            println!("{}", token);
            println!();
            println!("Use it as: Authorization: Bearer <token>");
        }
        Err(e) => {
            eprintln!("❌ Failed to sign token: {}", e);
            std::process::exit(1);
        }
    }
}
