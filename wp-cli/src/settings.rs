use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub struct Settings {
    pub url: String,
    pub user: String,
    pub password: String,
    pub blog_id: i64,
    pub log_level: String,
}

/// Значения из командной строки, которые перекрывают окружение.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub blog_id: Option<i64>,
}

impl Settings {
    pub fn from_env(overrides: Overrides) -> Result<Self> {
        let url = match overrides.url {
            Some(url) => non_empty("--url", url)?,
            None => get_required("WP_URL").context("WP_URL or --url is required")?,
        };
        let user = match overrides.user {
            Some(user) => non_empty("--user", user)?,
            None => get_required("WP_USER").context("WP_USER or --user is required")?,
        };
        let password = match overrides.password {
            Some(password) => non_empty("--password", password)?,
            None => get_required("WP_PASSWORD").context("WP_PASSWORD or --password is required")?,
        };
        let blog_id = match overrides.blog_id {
            Some(blog_id) => blog_id,
            None => std::env::var("WP_BLOG_ID")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .context("Failed to parse WP_BLOG_ID, expecting integer")?,
        };
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string());

        Ok(Self {
            url: normalize_url(url),
            user,
            password,
            blog_id,
            log_level,
        })
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    non_empty(key, value)
}

fn non_empty(key: &str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

/// Дописывает схему и `/xmlrpc.php`, если передан только адрес блога.
pub fn normalize_url(url: String) -> String {
    let url = if url.starts_with("http://") || url.starts_with("https://") {
        url
    } else {
        format!("http://{url}")
    };

    if url.ends_with(".php") {
        return url;
    }
    format!("{}/xmlrpc.php", url.trim_end_matches('/'))
}
