//! Field-format checks shared by registration, profile updates and listings.
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("valid email regex")
});

static CONTACT_EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid contact email regex"));

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("valid phone regex"));

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s]+$").expect("valid name regex"));

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url regex"));

pub const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Account email: word characters around `@` and a 2-3 letter final label.
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 100 && EMAIL_RE.is_match(email)
}

/// Listing contact email; looser than the account rule.
pub fn is_valid_contact_email(email: &str) -> bool {
    CONTACT_EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// 2..=50 characters, ASCII letters and spaces only.
pub fn is_valid_name(name: &str) -> bool {
    (2..=50).contains(&name.chars().count()) && NAME_RE.is_match(name)
}

pub fn is_valid_url(url: &str) -> bool {
    URL_RE.is_match(url)
}

/// At least 8 characters with a lowercase letter, an uppercase letter, a digit
/// and one of `@$!%*?&`.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_emails() {
        assert!(is_valid_email("test@test.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("user@domain.toolong"));
        assert!(!is_valid_email(&format!("{}@test.com", "a".repeat(100))));
    }

    #[test]
    fn phones() {
        assert!(is_valid_phone("+15551234567"));
        assert!(is_valid_phone("5551234"));
        assert!(!is_valid_phone("0555"));
        assert!(!is_valid_phone("555-1234"));
        assert!(!is_valid_phone("+12345678901234567"));
    }

    #[test]
    fn names() {
        assert!(is_valid_name("Jane Doe"));
        assert!(!is_valid_name("J"));
        assert!(!is_valid_name("R2D2"));
        assert!(!is_valid_name(&"a".repeat(51)));
    }

    #[test]
    fn passwords() {
        assert!(is_strong_password("Password123!"));
        assert!(!is_strong_password("password123!"));
        assert!(!is_strong_password("PASSWORD123!"));
        assert!(!is_strong_password("Password!!!"));
        assert!(!is_strong_password("Password123"));
        assert!(!is_strong_password("Pa1!"));
    }

    #[test]
    fn urls() {
        assert!(is_valid_url("https://cdn.example.com/a.jpg"));
        assert!(is_valid_url("http://localhost:3001/uploads/apartments/x.png"));
        assert!(!is_valid_url("ftp://example.com/a.jpg"));
        assert!(!is_valid_url("not a url"));
    }
}
