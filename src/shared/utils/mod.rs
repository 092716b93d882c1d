pub mod email_validator;

use rand::seq::SliceRandom;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Special characters accepted by the password complexity rules.
pub const SPECIAL_CHARS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Generate an initial password for an account registered without one.
///
/// Always 16 characters and always satisfies the complexity rules
/// (upper, lower, digit, special), shuffled so character classes are
/// not in predictable positions.
pub fn generate_initial_password() -> String {
    let mut rng = thread_rng();

    let mut password: Vec<u8> = (0..8).map(|_| rng.sample(Alphanumeric)).collect();
    password.push(rng.gen_range(b'A'..=b'Z'));
    password.push(rng.gen_range(b'a'..=b'z'));
    for _ in 0..2 {
        password.push(rng.gen_range(b'0'..=b'9'));
    }
    for _ in 0..4 {
        password.push(SPECIAL_CHARS[rng.gen_range(0..SPECIAL_CHARS.len())]);
    }

    password.shuffle(&mut rng);

    password.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_initial_password_length() {
        assert_eq!(generate_initial_password().len(), 16);
    }

    #[test]
    fn test_initial_password_meets_complexity() {
        for _ in 0..20 {
            let password = generate_initial_password();
            assert!(password.chars().any(|c| c.is_ascii_uppercase()));
            assert!(password.chars().any(|c| c.is_ascii_lowercase()));
            assert!(password.chars().any(|c| c.is_ascii_digit()));
            assert!(password.bytes().any(|c| SPECIAL_CHARS.contains(&c)));
        }
    }

    #[test]
    fn test_initial_password_uniqueness() {
        let passwords: HashSet<String> = (0..50).map(|_| generate_initial_password()).collect();
        assert_eq!(passwords.len(), 50);
    }
}
