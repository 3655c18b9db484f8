use envconfig::Envconfig;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "DATABASE_URL")]
    pub db_url: String,
    #[envconfig(from = "PORT", default = "8080")]
    pub port: u16,
    /// Public origin of the website, used to build password reset links.
    #[envconfig(from = "BASE_URL", default = "http://localhost:3000")]
    pub base_url: String,
    /// Base64 encoded HMAC secret for session tokens.
    #[envconfig(from = "JWT_SECRET")]
    pub jwt_secret: String,
    #[envconfig(from = "PUBLIC_DIR", default = "public")]
    pub public_dir: String,
    #[envconfig(from = "RESET_TOKEN_TTL_MINUTES", default = "60")]
    pub reset_token_ttl_minutes: u64,
    #[envconfig(from = "SMTP_RELAY", default = "smtp.gmail.com")]
    pub smtp_relay: String,
    #[envconfig(from = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,
    #[envconfig(from = "SMTP_PASSWORD")]
    pub smtp_password: Option<String>,
}
