//! `token`: print an access token for local testing.

use clap::Args;

use parley_auth::JwtEncoder;
use parley_core::config::AppConfig;
use parley_core::error::AppError;
use parley_core::types::id::UserId;

/// Arguments for `token`.
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// User id to put in the `sub` claim
    #[arg(long)]
    pub user: UserId,

    /// Username claim
    #[arg(long, default_value = "dev")]
    pub username: String,
}

/// Print the token and its expiry to stdout.
pub fn execute(args: &TokenArgs, config: &AppConfig) -> Result<(), AppError> {
    let encoder = JwtEncoder::new(&config.auth);
    let (token, expires_at) = encoder.generate_access_token(args.user, &args.username)?;
    println!("{token}");
    eprintln!("expires at {}", expires_at.to_rfc3339());
    Ok(())
}
