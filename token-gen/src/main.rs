use clap::{Parser, ValueEnum};
use jsonwebtoken::Algorithm;
use jwt_gate::services::auth::{Claims, JwtCodec, JwtSecret};

/// Issue an HMAC-signed JWT for exercising a jwt-gate protected service.
///
/// - Claims: iss / sub optional, exp from --ttl, nbf from --nbf-delay, plus any --claim k=v
/// - Values given via --claim are parsed as JSON when possible, otherwise kept as strings
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Shared secret (same value as the server's JWT_SECRET)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    secret: String,

    #[arg(long, value_enum, default_value_t = Alg::Hs256)]
    alg: Alg,

    #[arg(long)]
    iss: Option<String>,

    #[arg(long)]
    sub: Option<String>,

    /// Seconds until `exp`. Omit for a token without expiry.
    #[arg(long)]
    ttl: Option<i64>,

    /// Seconds until `nbf`. Negative values back-date it.
    #[arg(long, allow_hyphen_values = true)]
    nbf_delay: Option<i64>,

    /// Extra claim as key=value (repeatable)
    #[arg(long = "claim", value_name = "KEY=VALUE")]
    claims: Vec<String>,

    /// Override "now" (unix seconds). Default: current time.
    #[arg(long)]
    now: Option<i64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Alg {
    Hs256,
    Hs384,
    Hs512,
}

impl From<Alg> for Algorithm {
    fn from(alg: Alg) -> Self {
        match alg {
            Alg::Hs256 => Algorithm::HS256,
            Alg::Hs384 => Algorithm::HS384,
            Alg::Hs512 => Algorithm::HS512,
        }
    }
}

fn parse_claim(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("claim must be KEY=VALUE, got {raw:?}"))?;
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn offset(now: i64, secs: i64, flag: &str) -> Result<i64, String> {
    now.checked_add(secs)
        .ok_or_else(|| format!("{flag} {secs} overflows a unix timestamp from {now}"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let secret = JwtSecret::new(args.secret)?;
    let now = args.now.unwrap_or_else(|| chrono::Utc::now().timestamp());

    let mut claims = Claims::new().with("iat", now);
    if let Some(iss) = args.iss {
        claims = claims.with("iss", iss);
    }
    if let Some(sub) = args.sub {
        claims = claims.with("sub", sub);
    }
    if let Some(ttl) = args.ttl {
        claims = claims.with("exp", offset(now, ttl, "--ttl")?);
    }
    if let Some(delay) = args.nbf_delay {
        claims = claims.with("nbf", offset(now, delay, "--nbf-delay")?);
    }
    for raw in &args.claims {
        let (key, value) = parse_claim(raw)?;
        claims = claims.with(key, value);
    }

    let token = JwtCodec::encode_with(args.alg.into(), &claims, &secret)?;
    println!("{}", token);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_values_prefer_json() {
        assert_eq!(
            parse_claim("admin=true").unwrap(),
            ("admin".to_string(), serde_json::json!(true))
        );
        assert_eq!(
            parse_claim("aud=api").unwrap(),
            ("aud".to_string(), serde_json::json!("api"))
        );
        assert!(parse_claim("novalue").is_err());
    }

    #[test]
    fn time_offsets_reject_overflow() {
        assert_eq!(offset(1_700_000_000, 60, "--ttl"), Ok(1_700_000_060));
        assert_eq!(offset(1_700_000_000, -60, "--nbf-delay"), Ok(1_699_999_940));
        assert!(offset(1_700_000_000, i64::MAX, "--ttl").is_err());
        assert!(offset(i64::MIN, -1, "--nbf-delay").is_err());
    }
}
